//! Structured-graph (BPMN XML) parser
//!
//! Extracts callable units from the flow graph, derives each unit's method
//! and endpoint, then reorders the units by walking sequence flows from the
//! start event.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use quick_xml::encoding::Decoder;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::errors::FlowpulseError;
use crate::http::HttpMethod;
use super::model::{ProcessDefinition, Step};

/// Default process name when neither the caller nor the document names it
pub const DEFAULT_NAME: &str = "BPMN Process";

/// Element kinds treated as callable units
const TASK_KINDS: &[&str] = &[
    "task",
    "serviceTask",
    "userTask",
    "scriptTask",
    "sendTask",
    "receiveTask",
    "manualTask",
    "businessRuleTask",
    "callActivity",
];

/// Other flow-node kinds, used when a document has no callable units
const OTHER_FLOW_NODES: &[&str] = &[
    "startEvent",
    "endEvent",
    "intermediateCatchEvent",
    "intermediateThrowEvent",
    "boundaryEvent",
    "subProcess",
    "transaction",
];

const PROP_ENDPOINT: &str = "api.endpoint";
const PROP_METHOD: &str = "api.method";
const PROP_SPEC: &str = "api.spec";

static DOC_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(GET|POST|PUT|DELETE|PATCH)\s+(/.+)$").expect("Invalid documentation call regex")
});
static NAME_COLON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":\s*(GET|POST|PUT|DELETE|PATCH)\s+(/\S*)").expect("Invalid name call regex")
});
static NAME_SIMPLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(GET|POST|PUT|DELETE|PATCH)\s+(/\S*)").expect("Invalid bare call regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Task,
    StartEvent,
    EndEvent,
    Gateway,
    Other,
}

impl NodeKind {
    fn classify(local_name: &str) -> Option<Self> {
        if TASK_KINDS.contains(&local_name) {
            Some(NodeKind::Task)
        } else if local_name == "startEvent" {
            Some(NodeKind::StartEvent)
        } else if local_name == "endEvent" {
            Some(NodeKind::EndEvent)
        } else if local_name.ends_with("Gateway") {
            Some(NodeKind::Gateway)
        } else if OTHER_FLOW_NODES.contains(&local_name) {
            Some(NodeKind::Other)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
struct FlowNode {
    id: String,
    name: Option<String>,
    kind: NodeKind,
    documentation: Option<String>,
    properties: Vec<(String, String)>,
    /// Element nesting depth, used to attach documentation to its owner
    depth: usize,
    /// Document position
    seq: usize,
}

/// Everything the parser needs from the XML document
#[derive(Debug, Default)]
struct FlowGraph {
    process_name: Option<String>,
    process_doc: Option<String>,
    has_process: bool,
    nodes: Vec<FlowNode>,
    flows: Vec<(String, String)>,
}

impl FlowGraph {
    fn start_node(&self) -> Option<&str> {
        self.nodes
            .iter()
            .find(|n| n.kind == NodeKind::StartEvent)
            .map(|n| n.id.as_str())
    }

    /// One successor per source node; the last flow seen for a source wins
    fn successors(&self) -> HashMap<&str, &str> {
        let mut map = HashMap::new();
        for (source, target) in &self.flows {
            map.insert(source.as_str(), target.as_str());
        }
        map
    }
}

/// API hints found on one source (properties, documentation or name)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiHints {
    pub method: Option<HttpMethod>,
    pub endpoint: Option<String>,
}

fn parse_method(raw: &str) -> Option<HttpMethod> {
    match raw.parse() {
        Ok(m) => Some(m),
        Err(_) => {
            warn!(method = raw, "Ignoring unsupported HTTP method");
            None
        }
    }
}

/// Read `METHOD /path`, `endpoint: <path>` and `method: <VERB>` lines
///
/// A `METHOD /path` line sets both fields and ends the scan.
pub fn parse_documentation(text: &str) -> ApiHints {
    let mut hints = ApiHints::default();

    for line in text.lines() {
        let line = line.trim();

        if let Some(caps) = DOC_CALL_RE.captures(line) {
            hints.method = parse_method(&caps[1]);
            hints.endpoint = Some(caps[2].trim().to_string());
            return hints;
        }

        let lower = line.to_lowercase();
        if lower.starts_with("endpoint:") {
            let value = line["endpoint:".len()..].trim();
            if !value.is_empty() {
                hints.endpoint = Some(value.to_string());
            }
        } else if lower.starts_with("method:") {
            hints.method = parse_method(line["method:".len()..].trim());
        }
    }

    hints
}

/// Read `: METHOD /path`, falling back to a bare `METHOD /path`, from a display name
pub fn parse_task_name(name: &str) -> ApiHints {
    let caps = NAME_COLON_RE
        .captures(name)
        .or_else(|| NAME_SIMPLE_RE.captures(name));

    match caps {
        Some(caps) => ApiHints {
            method: parse_method(&caps[1]),
            endpoint: Some(caps[2].to_string()),
        },
        None => ApiHints::default(),
    }
}

/// Structured properties take precedence over documentation, which takes
/// precedence over the display name. Each field is resolved independently.
fn derive_step(node: &FlowNode) -> Step {
    let mut props = ApiHints::default();
    let mut spec = None;
    for (name, value) in &node.properties {
        match name.as_str() {
            PROP_ENDPOINT => props.endpoint = Some(value.clone()),
            PROP_METHOD => props.method = parse_method(value),
            PROP_SPEC => spec = Some(value.clone()),
            _ => {}
        }
    }

    let doc = node
        .documentation
        .as_deref()
        .map(parse_documentation)
        .unwrap_or_default();
    let from_name = node
        .name
        .as_deref()
        .map(parse_task_name)
        .unwrap_or_default();

    let mut step = Step::new(
        node.id.clone(),
        node.name.clone().unwrap_or_else(|| node.id.clone()),
    );
    step.endpoint = props.endpoint.or(doc.endpoint).or(from_name.endpoint);
    step.method = props.method.or(doc.method).or(from_name.method);
    step.schema = spec;

    debug!(
        task = %node.id,
        endpoint = step.endpoint.as_deref().unwrap_or("-"),
        method = step.method.map(|m| m.as_str()).unwrap_or("-"),
        "Extracted API info"
    );
    step
}

fn invalid_xml(e: impl std::fmt::Display) -> FlowpulseError {
    FlowpulseError::Parse(format!("Invalid BPMN XML: {}", e))
}

fn attr(e: &BytesStart<'_>, wanted: &str, decoder: Decoder) -> Result<Option<String>, FlowpulseError> {
    for a in e.attributes() {
        let a = a.map_err(invalid_xml)?;
        if a.key.local_name().as_ref() == wanted.as_bytes() {
            let value = a.decode_and_unescape_value(decoder).map_err(invalid_xml)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn resolve_reference(r: &BytesRef<'_>) -> Result<Option<String>, FlowpulseError> {
    if let Some(c) = r.resolve_char_ref().map_err(invalid_xml)? {
        return Ok(Some(c.to_string()));
    }
    let name = r.decode().map_err(invalid_xml)?;
    Ok(resolve_predefined_entity(&name).map(str::to_string))
}

/// Walk the XML once, collecting flow nodes, sequence flows and process metadata
fn read_graph(xml: &str) -> Result<FlowGraph, FlowpulseError> {
    // Text is left untrimmed: references split it into several events, and
    // documentation is trimmed once fully assembled.
    let mut reader = Reader::from_str(xml);
    let decoder = reader.decoder();

    let mut graph = FlowGraph::default();
    let mut open: Vec<FlowNode> = Vec::new();
    let mut depth = 0usize;
    let mut seq = 0usize;
    let mut process_depth: Option<usize> = None;
    // (owner depth, buffer) while inside a <documentation> element
    let mut doc_buffer: Option<(usize, String)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            FlowpulseError::Parse(format!(
                "Invalid BPMN XML at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                let element_depth = depth;
                if !is_empty {
                    depth += 1;
                }

                if local == "process" {
                    graph.has_process = true;
                    if graph.process_name.is_none() {
                        graph.process_name = attr(e, "name", decoder)?.filter(|n| !n.trim().is_empty());
                    }
                    if !is_empty && process_depth.is_none() {
                        process_depth = Some(element_depth);
                    }
                } else if local == "sequenceFlow" {
                    let source = attr(e, "sourceRef", decoder)?;
                    let target = attr(e, "targetRef", decoder)?;
                    if let (Some(source), Some(target)) = (source, target) {
                        graph.flows.push((source, target));
                    }
                } else if local == "documentation" && !is_empty {
                    doc_buffer = Some((element_depth.saturating_sub(1), String::new()));
                } else if local == "property" {
                    let name = attr(e, "name", decoder)?;
                    let value = attr(e, "value", decoder)?.unwrap_or_default();
                    if let (Some(node), Some(name)) = (open.last_mut(), name) {
                        node.properties.push((name, value));
                    }
                } else if let Some(kind) = NodeKind::classify(&local) {
                    let node = FlowNode {
                        id: attr(e, "id", decoder)?.unwrap_or_else(|| format!("{}_{}", local, seq)),
                        name: attr(e, "name", decoder)?.filter(|n| !n.trim().is_empty()),
                        kind,
                        documentation: None,
                        properties: Vec::new(),
                        depth: element_depth,
                        seq,
                    };
                    seq += 1;
                    if is_empty {
                        graph.nodes.push(node);
                    } else {
                        open.push(node);
                    }
                }
            }
            Event::End(ref e) => {
                depth = depth.saturating_sub(1);
                let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();

                if local == "documentation" {
                    if let Some((owner_depth, text)) = doc_buffer.take() {
                        let text = text.trim().to_string();
                        if let Some(node) = open.last_mut().filter(|n| n.depth == owner_depth) {
                            node.documentation.get_or_insert(text);
                        } else if process_depth == Some(owner_depth) {
                            graph.process_doc.get_or_insert(text);
                        }
                    }
                } else if open.last().map(|n| n.depth) == Some(depth) {
                    if let Some(node) = open.pop() {
                        graph.nodes.push(node);
                    }
                }
            }
            Event::Text(ref t) => {
                if let Some((_, ref mut buf)) = doc_buffer {
                    buf.push_str(&t.xml_content().map_err(invalid_xml)?);
                }
            }
            Event::CData(ref t) => {
                if let Some((_, ref mut buf)) = doc_buffer {
                    buf.push_str(&String::from_utf8_lossy(t.as_ref()));
                }
            }
            Event::GeneralRef(ref r) => {
                if let Some((_, ref mut buf)) = doc_buffer {
                    match resolve_reference(r)? {
                        Some(text) => buf.push_str(&text),
                        None => warn!(entity = %String::from_utf8_lossy(r.as_ref()), "Ignoring unknown entity reference"),
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 || !open.is_empty() {
        return Err(FlowpulseError::Parse(
            "Invalid BPMN XML: unexpected end of document".to_string(),
        ));
    }

    graph.nodes.sort_by_key(|n| n.seq);
    Ok(graph)
}

/// Reorder steps by following the successor map from `start`
///
/// Stops at a revisited node or after `2 * steps.len()` iterations; steps the
/// walk never reached keep their relative order at the end.
pub fn order_by_flow(steps: Vec<Step>, successors: &HashMap<&str, &str>, start: Option<&str>) -> Vec<Step> {
    let Some(start) = start else {
        warn!("No start event found, keeping extraction order");
        return steps;
    };

    let index: HashMap<&str, usize> = steps
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.as_str(), i))
        .collect();

    let max_iterations = steps.len() * 2;
    let mut visited: HashSet<&str> = HashSet::new();
    let mut ordered_idx: Vec<usize> = Vec::with_capacity(steps.len());
    let mut placed = vec![false; steps.len()];
    let mut current = Some(start);
    let mut iterations = 0;

    while let Some(id) = current {
        if visited.contains(id) || iterations >= max_iterations {
            break;
        }
        visited.insert(id);
        iterations += 1;

        if let Some(&i) = index.get(id) {
            if !placed[i] {
                placed[i] = true;
                ordered_idx.push(i);
            }
        }
        current = successors.get(id).copied();
    }

    ordered_idx.extend((0..steps.len()).filter(|&i| !placed[i]));

    let mut slots: Vec<Option<Step>> = steps.into_iter().map(Some).collect();
    ordered_idx
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

/// Reject text that is not a well-formed BPMN document
pub fn validate(xml: &str) -> Result<(), FlowpulseError> {
    if xml.trim().is_empty() {
        return Err(FlowpulseError::Parse("BPMN XML cannot be empty".to_string()));
    }
    let graph = read_graph(xml)?;
    if !graph.has_process {
        return Err(FlowpulseError::Parse("No BPMN process found in XML".to_string()));
    }
    Ok(())
}

pub fn parse(xml: &str, name: Option<&str>) -> Result<ProcessDefinition, FlowpulseError> {
    if xml.trim().is_empty() {
        return Err(FlowpulseError::Parse("BPMN XML cannot be empty".to_string()));
    }
    let graph = read_graph(xml)?;
    if !graph.has_process {
        return Err(FlowpulseError::Parse("No BPMN process found in XML".to_string()));
    }

    let mut units: Vec<&FlowNode> = graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Task)
        .collect();

    if units.is_empty() {
        warn!("No tasks found, falling back to named flow nodes");
        units = graph
            .nodes
            .iter()
            .filter(|n| {
                n.name.is_some()
                    && !matches!(n.kind, NodeKind::StartEvent | NodeKind::EndEvent | NodeKind::Gateway)
            })
            .collect();
    }

    if units.is_empty() {
        return Err(FlowpulseError::Parse(
            "BPMN process contains no tasks to execute".to_string(),
        ));
    }

    let steps: Vec<Step> = units.into_iter().map(derive_step).collect();
    let successors = graph.successors();
    let steps = order_by_flow(steps, &successors, graph.start_node());

    let process_name = name
        .map(str::to_string)
        .or_else(|| graph.process_name.clone())
        .unwrap_or_else(|| DEFAULT_NAME.to_string());

    info!(process = %process_name, steps = steps.len(), "Parsed BPMN process");
    Ok(ProcessDefinition::new(
        process_name,
        graph.process_doc.clone(),
        xml,
        steps,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINEAR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"
                  xmlns:camunda="http://camunda.org/schema/1.0/bpmn">
  <bpmn:process id="payments" name="Payments">
    <bpmn:documentation>Pay a merchant</bpmn:documentation>
    <bpmn:startEvent id="start"/>
    <bpmn:serviceTask id="pay" name="Make payment">
      <bpmn:documentation>POST /payments</bpmn:documentation>
    </bpmn:serviceTask>
    <bpmn:task id="balance" name="Get balance: GET /accounts/{accountId}/balances"/>
    <bpmn:serviceTask id="auth" name="Authenticate">
      <bpmn:extensionElements>
        <camunda:properties>
          <camunda:property name="api.endpoint" value="/auth/token"/>
          <camunda:property name="api.method" value="POST"/>
        </camunda:properties>
      </bpmn:extensionElements>
    </bpmn:serviceTask>
    <bpmn:endEvent id="end"/>
    <bpmn:sequenceFlow id="f1" sourceRef="start" targetRef="auth"/>
    <bpmn:sequenceFlow id="f2" sourceRef="auth" targetRef="balance"/>
    <bpmn:sequenceFlow id="f3" sourceRef="balance" targetRef="pay"/>
    <bpmn:sequenceFlow id="f4" sourceRef="pay" targetRef="end"/>
  </bpmn:process>
</bpmn:definitions>"#;

    #[test]
    fn test_parse_documentation_call_line() {
        let hints = parse_documentation("Creates a payment\nPOST /payments\nmethod: GET");
        assert_eq!(hints.method, Some(HttpMethod::Post));
        assert_eq!(hints.endpoint.as_deref(), Some("/payments"));
    }

    #[test]
    fn test_parse_documentation_key_values() {
        let hints = parse_documentation("Endpoint: /orders/{orderId}\nmethod: delete");
        assert_eq!(hints.method, Some(HttpMethod::Delete));
        assert_eq!(hints.endpoint.as_deref(), Some("/orders/{orderId}"));
    }

    #[test]
    fn test_parse_task_name_patterns() {
        let colon = parse_task_name("Check status: GET /status GET /ignored");
        assert_eq!(colon.endpoint.as_deref(), Some("/status"));

        let simple = parse_task_name("PUT /orders/1 update");
        assert_eq!(simple.method, Some(HttpMethod::Put));
        assert_eq!(simple.endpoint.as_deref(), Some("/orders/1"));

        assert_eq!(parse_task_name("Review manually"), ApiHints::default());
    }

    #[test]
    fn test_parse_linear_process_follows_flow() {
        let def = parse(LINEAR, None).unwrap();
        assert_eq!(def.name(), "Payments");
        assert_eq!(def.description(), Some("Pay a merchant"));

        let ids: Vec<&str> = def.steps().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["auth", "balance", "pay"]);

        let auth = &def.steps()[0];
        assert_eq!(auth.method, Some(HttpMethod::Post));
        assert_eq!(auth.endpoint.as_deref(), Some("/auth/token"));

        let balance = &def.steps()[1];
        assert_eq!(balance.endpoint.as_deref(), Some("/accounts/{accountId}/balances"));

        let pay = &def.steps()[2];
        assert_eq!(pay.method, Some(HttpMethod::Post));
        assert_eq!(pay.endpoint.as_deref(), Some("/payments"));

        assert_eq!(def.steps().iter().map(|s| s.order).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_properties_win_over_documentation() {
        let xml = r#"<definitions><process id="p">
            <serviceTask id="t" name="Do: GET /from-name">
              <documentation>endpoint: /from-doc
method: PUT</documentation>
              <extensionElements><properties>
                <property name="api.endpoint" value="/from-props"/>
              </properties></extensionElements>
            </serviceTask>
        </process></definitions>"#;
        let def = parse(xml, Some("p")).unwrap();
        let step = &def.steps()[0];
        assert_eq!(step.endpoint.as_deref(), Some("/from-props"));
        assert_eq!(step.method, Some(HttpMethod::Put));
    }

    #[test]
    fn test_no_start_event_keeps_extraction_order() {
        let xml = r#"<definitions><process id="p">
            <task id="b" name="GET /b"/>
            <task id="a" name="GET /a"/>
            <sequenceFlow id="f" sourceRef="a" targetRef="b"/>
        </process></definitions>"#;
        let def = parse(xml, None).unwrap();
        let ids: Vec<&str> = def.steps().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_unreached_units_appended() {
        let xml = r#"<definitions><process id="p">
            <startEvent id="s"/>
            <task id="x" name="GET /x"/>
            <task id="y" name="GET /y"/>
            <task id="z" name="GET /z"/>
            <sequenceFlow id="f1" sourceRef="s" targetRef="z"/>
        </process></definitions>"#;
        let def = parse(xml, None).unwrap();
        let ids: Vec<&str> = def.steps().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "x", "y"]);
    }

    #[test]
    fn test_cycle_terminates_without_duplicates() {
        let xml = r#"<definitions><process id="p">
            <startEvent id="s"/>
            <task id="a" name="GET /a"/>
            <task id="b" name="GET /b"/>
            <sequenceFlow id="f1" sourceRef="s" targetRef="a"/>
            <sequenceFlow id="f2" sourceRef="a" targetRef="b"/>
            <sequenceFlow id="f3" sourceRef="b" targetRef="a"/>
        </process></definitions>"#;
        let def = parse(xml, None).unwrap();
        let ids: Vec<&str> = def.steps().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_last_outgoing_edge_wins() {
        let xml = r#"<definitions><process id="p">
            <startEvent id="s"/>
            <task id="a" name="GET /a"/>
            <task id="b" name="GET /b"/>
            <sequenceFlow id="f1" sourceRef="s" targetRef="a"/>
            <sequenceFlow id="f2" sourceRef="s" targetRef="b"/>
        </process></definitions>"#;
        let def = parse(xml, None).unwrap();
        assert_eq!(def.steps()[0].id, "b");
    }

    #[test]
    fn test_falls_back_to_named_flow_nodes() {
        let xml = r#"<definitions><process id="p">
            <startEvent id="s" name="Begin"/>
            <intermediateThrowEvent id="notify" name="Notify: POST /notifications"/>
            <endEvent id="e" name="Done"/>
        </process></definitions>"#;
        let def = parse(xml, None).unwrap();
        assert_eq!(def.len(), 1);
        assert_eq!(def.steps()[0].endpoint.as_deref(), Some("/notifications"));
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        let err = parse("<definitions><process id=\"p\"><task id=\"a\"></process>", None).unwrap_err();
        assert!(matches!(err, FlowpulseError::Parse(_)));

        assert!(validate("<definitions><process id=\"p\">").is_err());
        assert!(validate("<definitions/>").is_err());
        assert!(validate(LINEAR).is_ok());
    }

    #[test]
    fn test_entity_at_line_end_keeps_line_break() {
        let xml = "<definitions><process id=\"p\">\
            <task id=\"t\" name=\"Pay\"><documentation>Check &lt;balance&gt;\nPOST /payments</documentation></task>\
            </process></definitions>";
        let def = parse(xml, None).unwrap();
        let step = &def.steps()[0];
        assert_eq!(step.method, Some(HttpMethod::Post));
        assert_eq!(step.endpoint.as_deref(), Some("/payments"));
    }

    #[test]
    fn test_character_references_resolved() {
        let xml = r#"<definitions><process id="p" name="Fees &amp; charges">
            <task id="t" name="Get: GET /a&#47;b">
              <documentation>endpoint: /fees&#x2F;{feeId}</documentation>
            </task>
        </process></definitions>"#;
        let def = parse(xml, None).unwrap();
        assert_eq!(def.name(), "Fees & charges");
        let step = &def.steps()[0];
        assert_eq!(step.name, "Get: GET /a/b");
        assert_eq!(step.endpoint.as_deref(), Some("/fees/{feeId}"));
        assert_eq!(step.method, Some(HttpMethod::Get));
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse(LINEAR, None).unwrap(), parse(LINEAR, None).unwrap());
    }

    #[test]
    fn test_order_by_flow_iteration_cap() {
        let steps = vec![Step::new("a", "a"), Step::new("b", "b")];
        let mut successors = HashMap::new();
        successors.insert("s", "n1");
        successors.insert("n1", "n2");
        successors.insert("n2", "n3");
        successors.insert("n3", "n4");
        successors.insert("n4", "b");
        // Cap of 4 iterations stops before reaching "b"
        let ordered = order_by_flow(steps, &successors, Some("s"));
        let ids: Vec<&str> = ordered.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
