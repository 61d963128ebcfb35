//! End-to-end layout tests over the public API.
//!
//! Flows are built both in code and from the front-end's JSON payload, run
//! through [`LayoutEngine::calculate`], and checked against the renderable
//! diagram they produce.

use plumline::{
    Flow, Id, LayoutConfig, LayoutEngine, PlumlineError,
    diagram::{Diagram, DiagramNode, DiagramNodeKind, LinkVariant},
    flow::{
        Branch, BranchLabel, InteractionType, Location, Node, NodeKind, NodeProperties,
        Participant, ParticipantKind,
    },
};

fn span(line: u32) -> Location {
    Location::new("main.bal", line, 4, line, 32)
}

fn call(line: u32, target: &str) -> Node {
    Node::new(NodeKind::Interaction, span(line))
        .with_interaction_type(InteractionType::FunctionCall)
        .with_target(target)
        .with_properties(NodeProperties::new().with_name(target))
}

fn function(id: &str, nodes: Vec<Node>) -> Participant {
    Participant::new(id, ParticipantKind::Function, id).with_nodes(nodes)
}

fn count_kind(diagram: &Diagram, kind: DiagramNodeKind) -> usize {
    diagram.nodes().iter().filter(|n| n.kind() == kind).count()
}

fn find_node(diagram: &Diagram, id: Id) -> Option<&DiagramNode> {
    diagram.nodes().iter().find(|n| n.id() == id)
}

#[test]
fn test_sequential_calls_stack_in_call_order() {
    let flow = Flow::new(vec![
        function("fn1", vec![call(1, "fn2"), call(2, "fn3")]),
        function("fn2", vec![]),
        function("fn3", vec![]),
    ]);
    let diagram = LayoutEngine::new()
        .calculate(&flow)
        .expect("acyclic flow lays out");

    // one column per participant, in call order
    let column = 60.0 + 160.0;
    for (id, index) in [("fn1", 0.0), ("fn2", 1.0), ("fn3", 2.0)] {
        let node = find_node(&diagram, Id::new(id)).expect("participant emitted");
        assert_eq!(node.kind(), DiagramNodeKind::Participant);
        assert_eq!(node.x(), index * column, "{id} sits in its call-order column");
    }

    assert_eq!(count_kind(&diagram, DiagramNodeKind::Point), 8);
    // two activation spans per call plus the entry lifeline
    assert_eq!(count_kind(&diagram, DiagramNodeKind::Lifeline), 5);

    let calls: Vec<_> = diagram
        .links()
        .iter()
        .filter(|l| l.variant() == LinkVariant::Call)
        .collect();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].label(), Some("fn2()"));
    assert_eq!(calls[1].label(), Some("fn3()"));

    let start_y = |link_source: Id| {
        find_node(&diagram, link_source)
            .expect("call source point emitted")
            .y()
    };
    assert!(
        start_y(calls[0].source()) < start_y(calls[1].source()),
        "the second call starts below the first"
    );

    let returns: Vec<_> = diagram
        .links()
        .iter()
        .filter(|l| l.variant() == LinkVariant::Return)
        .collect();
    assert_eq!(returns.len(), 2);
    assert!(returns.iter().all(|l| l.label().is_none()));

    // entry lifeline hangs off the participant box and spans both calls
    let lifeline = find_node(&diagram, Id::new("fn1::lifeline")).expect("entry lifeline emitted");
    assert_eq!(lifeline.x(), 0.0);
    assert_eq!(lifeline.y(), 40.0, "lifeline starts at the box bottom");
    assert_eq!(lifeline.height(), 150.0, "call span plus one group gap");
}

#[test]
fn test_endpoint_calls_label_with_the_bare_name() {
    let endpoint_call = Node::new(NodeKind::Interaction, span(1))
        .with_interaction_type(InteractionType::EndpointCall)
        .with_target("accounts_db")
        .with_properties(NodeProperties::new().with_name("accounts_db"));
    let flow = Flow::new(vec![
        function("fn1", vec![endpoint_call]),
        Participant::new("accounts_db", ParticipantKind::Endpoint, "accounts_db"),
    ]);
    let diagram = LayoutEngine::new()
        .calculate(&flow)
        .expect("endpoint flow lays out");

    let db = find_node(&diagram, Id::new("accounts_db")).expect("endpoint emitted");
    assert_eq!(db.participant_kind(), Some(ParticipantKind::Endpoint));

    let call_link = diagram
        .links()
        .iter()
        .find(|l| l.variant() == LinkVariant::Call)
        .expect("call link emitted");
    assert_eq!(
        call_link.label(),
        Some("accounts_db"),
        "endpoint labels carry no parameter list"
    );
}

#[test]
fn test_function_call_labels_render_the_parameter_list() {
    let transfer = Node::new(NodeKind::Interaction, span(1))
        .with_interaction_type(InteractionType::FunctionCall)
        .with_target("fn2")
        .with_properties(
            NodeProperties::new()
                .with_name("transfer")
                .with_params(vec!["id".into(), "amount".into()]),
        );
    let flow = Flow::new(vec![function("fn1", vec![transfer]), function("fn2", vec![])]);
    let diagram = LayoutEngine::new()
        .calculate(&flow)
        .expect("flow lays out");

    let call_link = diagram
        .links()
        .iter()
        .find(|l| l.variant() == LinkVariant::Call)
        .expect("call link emitted");
    assert_eq!(call_link.label(), Some("transfer(id, amount)"));
}

#[test]
fn test_return_nodes_add_no_geometry() {
    let return_node =
        Node::new(NodeKind::Interaction, span(2)).with_interaction_type(InteractionType::Return);
    let flow = Flow::new(vec![
        function("fn1", vec![call(1, "fn2"), return_node]),
        function("fn2", vec![]),
    ]);
    let diagram = LayoutEngine::new()
        .calculate(&flow)
        .expect("flow lays out");

    assert_eq!(
        count_kind(&diagram, DiagramNodeKind::Point),
        4,
        "only the call contributes markers"
    );
    assert_eq!(diagram.links().len(), 2, "only the call contributes links");
}

#[test]
fn test_missing_call_target_keeps_markers_and_links() {
    let flow = Flow::new(vec![function("fn1", vec![call(1, "ghost")])]);
    let diagram = LayoutEngine::new()
        .calculate(&flow)
        .expect("dangling targets are soft failures");

    assert_eq!(count_kind(&diagram, DiagramNodeKind::Participant), 1);
    assert!(
        find_node(&diagram, Id::new("ghost")).is_none(),
        "the missing participant is never invented"
    );
    assert_eq!(
        count_kind(&diagram, DiagramNodeKind::Point),
        4,
        "the call site still renders its markers"
    );
    assert_eq!(diagram.links().len(), 2);
    assert_eq!(
        count_kind(&diagram, DiagramNodeKind::Lifeline),
        0,
        "unpositioned returns produce no activation spans and no entry lifeline"
    );
}

#[test]
fn test_cyclic_flows_fail_with_the_rendered_chain() {
    let flow = Flow::new(vec![
        function("fn1", vec![call(1, "fn2")]),
        function("fn2", vec![call(10, "fn1")]),
    ]);
    let result = LayoutEngine::new().calculate(&flow);

    match result {
        Err(PlumlineError::CyclicCallGraph { path }) => {
            assert_eq!(path, "fn1 -> fn2 -> fn1");
        }
        other => panic!("expected a cyclic call graph error, got {other:?}"),
    }
}

#[test]
fn test_direct_recursion_fails() {
    let flow = Flow::new(vec![function("fn1", vec![call(1, "fn1")])]);
    let result = LayoutEngine::new().calculate(&flow);

    match result {
        Err(PlumlineError::CyclicCallGraph { path }) => {
            assert_eq!(path, "fn1 -> fn1");
        }
        other => panic!("expected a cyclic call graph error, got {other:?}"),
    }
}

#[test]
fn test_revisiting_a_participant_from_two_paths_is_legal() {
    // fn3 is reached both directly and through fn2; only re-entry on the
    // same chain counts as a cycle
    let flow = Flow::new(vec![
        function("fn1", vec![call(1, "fn2"), call(2, "fn3")]),
        function("fn2", vec![call(10, "fn3")]),
        function("fn3", vec![]),
    ]);
    let diagram = LayoutEngine::new()
        .calculate(&flow)
        .expect("diamond call graphs are acyclic");

    assert_eq!(count_kind(&diagram, DiagramNodeKind::Participant), 3);
    let fn3 = find_node(&diagram, Id::new("fn3")).expect("fn3 emitted once");
    assert_eq!(fn3.x(), 2.0 * 220.0, "fn3 keeps its first assigned column");

    assert_eq!(
        count_kind(&diagram, DiagramNodeKind::Point),
        12,
        "each of the three call sites keeps its own markers"
    );
    assert_eq!(diagram.links().len(), 6);
}

#[test]
fn test_conditionals_emit_breakpointed_containers() {
    let conditional = Node::new(NodeKind::If, span(3))
        .with_properties(NodeProperties::new().with_condition("balance >= amount"))
        .with_branches(vec![
            Branch::new(BranchLabel::Then, vec![call(4, "fn2")]),
            Branch::new(BranchLabel::Else, vec![call(6, "fn2")]),
        ]);
    let flow = Flow::new(vec![
        function("fn1", vec![conditional]),
        function("fn2", vec![]),
    ]);
    let diagram = LayoutEngine::new()
        .calculate(&flow)
        .expect("conditional flow lays out");

    assert_eq!(count_kind(&diagram, DiagramNodeKind::Container), 3);

    let labeled: Vec<_> = diagram
        .nodes()
        .iter()
        .filter(|n| n.kind() == DiagramNodeKind::Container && n.label().is_some())
        .collect();
    assert_eq!(labeled.len(), 1, "only the if box carries the condition");
    let container = labeled[0];
    assert_eq!(container.label(), Some("balance >= amount"));
    assert_eq!(container.x(), 40.0, "indented a quarter box into fn1's column");
    assert_eq!(
        container.width(),
        300.0,
        "spans to the rightmost participant the branches touch"
    );

    let breakpoint = container
        .breakpoint_percent()
        .expect("a non-empty else sets the breakpoint");
    assert!(
        breakpoint > 0.0 && breakpoint < 100.0,
        "breakpoint {breakpoint} must fall inside the container"
    );
}

#[test]
fn test_while_bodies_stack_without_containers() {
    let loop_node = Node::new(NodeKind::While, span(3))
        .with_properties(NodeProperties::new().with_condition("i < 10"))
        .with_branches(vec![Branch::new(BranchLabel::Body, vec![call(4, "fn2")])]);
    let flow = Flow::new(vec![
        function("fn1", vec![loop_node]),
        function("fn2", vec![]),
    ]);
    let diagram = LayoutEngine::new()
        .calculate(&flow)
        .expect("loop flow lays out");

    assert_eq!(count_kind(&diagram, DiagramNodeKind::Container), 0);
    assert_eq!(
        count_kind(&diagram, DiagramNodeKind::Point),
        4,
        "the body call still renders"
    );
    // the entry lifeline spans direct calls only, so a body-only flow
    // renders just the two activation spans
    assert_eq!(count_kind(&diagram, DiagramNodeKind::Lifeline), 2);
}

#[test]
fn test_others_render_as_trailing_columns_but_are_never_traversed() {
    let db = Participant::new("accounts_db", ParticipantKind::Endpoint, "accounts_db")
        .with_nodes(vec![call(20, "fn2")]);
    let flow = Flow::new(vec![
        function("fn1", vec![call(1, "fn2")]),
        function("fn2", vec![]),
    ])
    .with_others(vec![db]);
    let diagram = LayoutEngine::new()
        .calculate(&flow)
        .expect("flow with others lays out");

    let db = find_node(&diagram, Id::new("accounts_db")).expect("other participant emitted");
    assert_eq!(db.participant_kind(), Some(ParticipantKind::Endpoint));
    assert_eq!(db.x(), 2.0 * 220.0, "others land right of every primary");

    assert_eq!(
        count_kind(&diagram, DiagramNodeKind::Point),
        4,
        "nodes inside others are never traversed"
    );
    assert_eq!(count_kind(&diagram, DiagramNodeKind::Lifeline), 3);
}

#[test]
fn test_unknown_node_kinds_are_skipped_not_fatal() {
    let payload = r#"{
        "participants": [
            {
                "id": "fn1",
                "kind": "FUNCTION",
                "name": "fn1",
                "nodes": [
                    {
                        "kind": "COMMENT",
                        "location": {
                            "fileName": "main.bal",
                            "startLine": 1,
                            "startColumn": 4,
                            "endLine": 1,
                            "endColumn": 20
                        }
                    }
                ]
            }
        ]
    }"#;
    let flow = Flow::from_json(payload).expect("unrecognized kinds still deserialize");
    let diagram = LayoutEngine::new()
        .calculate(&flow)
        .expect("unknown nodes are skipped");

    assert_eq!(diagram.nodes().len(), 1, "only the participant box renders");
    assert!(diagram.links().is_empty());
}

#[test]
fn test_flow_json_to_diagram_json_round_trip() {
    let payload = r#"{
        "participants": [
            {
                "id": "money_transfer",
                "kind": "FUNCTION",
                "name": "money_transfer",
                "location": {
                    "fileName": "transfer.bal",
                    "startLine": 1,
                    "startColumn": 0,
                    "endLine": 20,
                    "endColumn": 1
                },
                "nodes": [
                    {
                        "kind": "INTERACTION",
                        "interactionType": "FUNCTION_CALL",
                        "targetId": "fetch_accounts",
                        "properties": { "name": "fetch_accounts", "params": ["id"] },
                        "location": {
                            "fileName": "transfer.bal",
                            "startLine": 3,
                            "startColumn": 4,
                            "endLine": 3,
                            "endColumn": 30
                        }
                    }
                ]
            },
            {
                "id": "fetch_accounts",
                "kind": "FUNCTION",
                "name": "fetch_accounts"
            }
        ],
        "others": [
            { "id": "accounts_db", "kind": "ENDPOINT", "name": "accounts_db" }
        ]
    }"#;

    let flow = Flow::from_json(payload).expect("payload deserializes");
    let diagram = LayoutEngine::new()
        .calculate(&flow)
        .expect("payload lays out");
    let text = diagram.to_json().expect("diagram serializes");
    let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");

    let nodes = value["nodes"].as_array().expect("nodes array");
    let by_id = |id: &str| {
        nodes
            .iter()
            .find(|n| n["id"] == id)
            .unwrap_or_else(|| panic!("node {id} missing from output"))
    };

    let entry = by_id("money_transfer");
    assert_eq!(entry["kind"], "participant");
    assert_eq!(entry["participantKind"], "FUNCTION");
    assert_eq!(entry["width"], 160.0);

    let db = by_id("accounts_db");
    assert_eq!(db["participantKind"], "ENDPOINT");
    assert_eq!(db["x"], 440.0);

    let start = by_id("transfer.bal:3:4:3:30::start");
    assert_eq!(start["kind"], "point");
    assert_eq!(start["y"], 60.0);

    let lifeline = by_id("money_transfer::lifeline");
    assert_eq!(lifeline["kind"], "lifeline");
    assert_eq!(lifeline["y"], 40.0);
    assert_eq!(lifeline["height"], 60.0);

    let links = value["links"].as_array().expect("links array");
    assert_eq!(links.len(), 2);
    let call_link = links
        .iter()
        .find(|l| l["variant"] == "call")
        .expect("call link present");
    assert_eq!(call_link["label"], "fetch_accounts(id)");
    assert_eq!(call_link["source"], "transfer.bal:3:4:3:30::start");
    let return_link = links
        .iter()
        .find(|l| l["variant"] == "return")
        .expect("return link present");
    assert!(
        return_link.get("label").is_none(),
        "unset labels are omitted from the wire format"
    );
}

#[test]
fn test_custom_config_rescales_the_grid() {
    let mut config = LayoutConfig::new();
    config.set_participant_width(100.0).set_participant_gap_x(50.0);
    let flow = Flow::new(vec![
        function("fn1", vec![call(1, "fn2")]),
        function("fn2", vec![]),
    ]);
    let diagram = LayoutEngine::with_config(config)
        .calculate(&flow)
        .expect("flow lays out");

    let fn2 = find_node(&diagram, Id::new("fn2")).expect("fn2 emitted");
    assert_eq!(fn2.x(), 150.0, "column pitch follows the config");
    assert_eq!(fn2.width(), 100.0);
}
