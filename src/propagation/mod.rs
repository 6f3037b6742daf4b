//! Classification propagation
//!
//! Keeps derived ("propagated") classification edges consistent with the
//! relationship graph. When a relationship is added, propagation-enabled
//! classifications on one end flow to every entity reachable from the other
//! end. When it is removed, a derived edge is only dropped if the entity can
//! no longer be reached from the classification's owning entity through any
//! surviving relationship path. An entity links to one classification vertex
//! per type, so a dropped edge is relinked to another owner of the same type
//! that still reaches the entity.
//!
//! Every graph mutation is a single [`GraphMutator`] call. A classification
//! whose step fails is recorded in the [`PropagationReport`] and the others
//! still proceed.

pub mod traversal;

pub use traversal::{impacted_vertices, propagation_mode, referring_vertices, TraversalError};

use crate::config::PropagationConfig;
use crate::error::{RepositoryError, RepositoryResult};
use crate::graph::{keys, Direction, EdgeId, GraphAccessor, GraphMutator, PropertyContainer, PropertyMap, PropertyValue, VertexId};
use crate::model::PropagateTags;
use crate::typesys::{TypeDef, TypeOracle};
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

/// Outcome of one propagation call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropagationReport {
    /// Propagated classification edges created
    pub edges_added: Vec<EdgeId>,
    /// Propagated classification edges removed
    pub edges_removed: Vec<EdgeId>,
    /// Classification steps that did not complete; retry on the next event
    pub failures: Vec<RepositoryError>,
}

impl PropagationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn merge(&mut self, other: PropagationReport) {
        self.edges_added.extend(other.edges_added);
        self.edges_removed.extend(other.edges_removed);
        self.failures.extend(other.failures);
    }
}

/// Maintains propagated classification edges
pub struct ClassificationPropagator<'a, T: TypeOracle + ?Sized> {
    types: &'a T,
    config: PropagationConfig,
}

/// A classification vertex about to flow across a relationship
struct Source {
    vertex: VertexId,
    type_name: String,
}

impl<'a, T: TypeOracle + ?Sized> ClassificationPropagator<'a, T> {
    pub fn new(types: &'a T) -> Self {
        Self::with_config(types, PropagationConfig::default())
    }

    pub fn with_config(types: &'a T, config: PropagationConfig) -> Self {
        Self { types, config }
    }

    /// Propagate across a newly added relationship edge
    pub fn on_relationship_added<G: GraphMutator + ?Sized>(
        &self,
        graph: &mut G,
        edge: EdgeId,
        mode: PropagateTags,
    ) -> RepositoryResult<PropagationReport> {
        let (end1, end2, guid) = relationship_ends(graph, edge)?;
        let mut report = PropagationReport::default();

        if mode.flows_end1_to_end2() {
            report.merge(self.add_across(graph, end1, end2, edge, guid.as_deref()));
        }
        if mode.flows_end2_to_end1() {
            report.merge(self.add_across(graph, end2, end1, edge, guid.as_deref()));
        }

        info!(
            "Relationship {} added ({}): {} propagated edges added, {} failures",
            edge,
            mode,
            report.edges_added.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Withdraw propagation across a relationship edge that is about to be
    /// removed. The edge must still be in the graph.
    pub fn on_relationship_removed<G: GraphMutator + ?Sized>(
        &self,
        graph: &mut G,
        edge: EdgeId,
        mode: PropagateTags,
    ) -> RepositoryResult<PropagationReport> {
        let (end1, end2, guid) = relationship_ends(graph, edge)?;
        let mut report = PropagationReport::default();

        if mode.flows_end1_to_end2() {
            report.merge(self.remove_across(graph, end1, end2, edge, guid.as_deref()));
        }
        if mode.flows_end2_to_end1() {
            report.merge(self.remove_across(graph, end2, end1, edge, guid.as_deref()));
        }

        info!(
            "Relationship {} removed ({}): {} propagated edges removed, {} failures",
            edge,
            mode,
            report.edges_removed.len(),
            report.failures.len()
        );
        Ok(report)
    }

    fn add_across<G: GraphMutator + ?Sized>(
        &self,
        graph: &mut G,
        from: VertexId,
        to: VertexId,
        edge: EdgeId,
        relationship_guid: Option<&str>,
    ) -> PropagationReport {
        let mut report = PropagationReport::default();
        let sources = self.propagating_classifications(&*graph, from, edge, &mut report);
        if sources.is_empty() {
            return report;
        }

        let impacted = match impacted_vertices(&*graph, to, relationship_guid, &self.config) {
            Ok(impacted) => impacted,
            Err(e) => {
                for source in &sources {
                    report.failures.push(step_failed(&source.type_name, edge, e.to_string()));
                }
                return report;
            }
        };

        for source in &sources {
            match self.add_classification(graph, source, &impacted) {
                Ok(added) => report.edges_added.extend(added),
                Err(e) => {
                    warn!("Propagation of {} across {} failed: {}", source.type_name, edge, e);
                    report.failures.push(step_failed(&source.type_name, edge, e.to_string()));
                }
            }
        }
        report
    }

    fn add_classification<G: GraphMutator + ?Sized>(
        &self,
        graph: &mut G,
        source: &Source,
        impacted: &[VertexId],
    ) -> RepositoryResult<Vec<EdgeId>> {
        let mut added = Vec::new();

        for &vertex in impacted {
            let entity_type = match graph.vertex(vertex).and_then(|v| v.string_property(keys::TYPE_NAME)) {
                Some(entity_type) => entity_type.to_string(),
                None => continue,
            };

            if has_classification(&*graph, vertex, &source.type_name) {
                debug!("{} already carries {}, skipped", vertex, source.type_name);
                continue;
            }
            if !self.types.can_apply_classification(&source.type_name, &entity_type) {
                debug!("{} does not apply to {} ({}), skipped", source.type_name, vertex, entity_type);
                continue;
            }

            let edge = attach_propagated(graph, vertex, source.vertex, &source.type_name)?;

            debug!("Propagated {} to {}", source.type_name, vertex);
            added.push(edge);
        }
        Ok(added)
    }

    fn remove_across<G: GraphMutator + ?Sized>(
        &self,
        graph: &mut G,
        from: VertexId,
        to: VertexId,
        edge: EdgeId,
        relationship_guid: Option<&str>,
    ) -> PropagationReport {
        let mut report = PropagationReport::default();
        let sources = self.propagating_classifications(&*graph, from, edge, &mut report);
        if sources.is_empty() {
            return report;
        }

        let impacted = match impacted_vertices(&*graph, to, relationship_guid, &self.config) {
            Ok(impacted) => impacted,
            Err(e) => {
                for source in &sources {
                    report.failures.push(step_failed(&source.type_name, edge, e.to_string()));
                }
                return report;
            }
        };

        for source in &sources {
            if let Err(e) = self.remove_classification(graph, source, &impacted, relationship_guid, &mut report) {
                warn!("Removing propagation of {} across {} failed: {}", source.type_name, edge, e);
                report.failures.push(step_failed(&source.type_name, edge, e.to_string()));
            }
        }
        report
    }

    fn remove_classification<G: GraphMutator + ?Sized>(
        &self,
        graph: &mut G,
        source: &Source,
        impacted: &[VertexId],
        relationship_guid: Option<&str>,
        report: &mut PropagationReport,
    ) -> RepositoryResult<()> {
        let owner = associated_entity(&*graph, source.vertex).ok_or_else(|| {
            RepositoryError::NotFound(format!("entity owning classification {}", source.vertex))
        })?;

        // Still reachable from the owner without the removed relationship
        let still_reached: FxHashSet<VertexId> = impacted_vertices(&*graph, owner, relationship_guid, &self.config)
            .map_err(|e| step_failed(&source.type_name, source.vertex, e.to_string()))?
            .into_iter()
            .collect();

        for &vertex in impacted {
            if still_reached.contains(&vertex) {
                debug!("{} still reaches {}, kept", source.type_name, vertex);
                continue;
            }

            let propagated: Vec<EdgeId> = graph
                .edges_by_label(vertex, keys::CLASSIFICATION_LABEL, Direction::Out)
                .into_iter()
                .filter(|e| e.target == source.vertex && is_propagated_edge(*e))
                .map(|e| e.id)
                .collect();
            if propagated.is_empty() {
                continue;
            }

            for edge in propagated {
                graph.remove_edge(edge)?;
                report.edges_removed.push(edge);
            }
            debug!("Removed propagated {} from {}", source.type_name, vertex);

            if !has_classification(&*graph, vertex, &source.type_name) {
                if let Some(other) = self.alternate_source(&*graph, vertex, source, relationship_guid)? {
                    let edge = attach_propagated(graph, vertex, other, &source.type_name)?;
                    debug!("{} on {} relinked to {}", source.type_name, vertex, other);
                    report.edges_added.push(edge);
                }
            }
            self.refresh_propagated_marker(graph, vertex)?;
        }
        Ok(())
    }

    /// A propagation-enabled classification vertex of the same type as
    /// `source` whose owner reaches `vertex` without the removed relationship
    fn alternate_source<G: GraphAccessor + ?Sized>(
        &self,
        graph: &G,
        vertex: VertexId,
        source: &Source,
        relationship_guid: Option<&str>,
    ) -> RepositoryResult<Option<VertexId>> {
        let upstream: Vec<VertexId> = referring_vertices(graph, vertex, relationship_guid, &self.config)
            .map_err(|e| step_failed(&source.type_name, vertex, e.to_string()))?;
        let reaching: FxHashSet<VertexId> = upstream.iter().copied().collect();

        for &candidate in &upstream {
            for edge in graph.edges_by_label(candidate, keys::CLASSIFICATION_LABEL, Direction::Out) {
                let classification = edge.target;
                if classification == source.vertex {
                    continue;
                }
                let Some(c) = graph.vertex(classification) else {
                    continue;
                };
                if c.string_property(keys::TYPE_NAME) != Some(source.type_name.as_str())
                    || !crate::retriever::is_propagation_enabled(c)
                {
                    continue;
                }
                if associated_entity(graph, classification).is_some_and(|owner| reaching.contains(&owner)) {
                    return Ok(Some(classification));
                }
            }
        }
        Ok(None)
    }

    /// Classification vertices on `from` (authoritative or propagated) with
    /// propagation enabled. Unresolvable classification types are reported.
    fn propagating_classifications<G: GraphAccessor + ?Sized>(
        &self,
        graph: &G,
        from: VertexId,
        edge: EdgeId,
        report: &mut PropagationReport,
    ) -> Vec<Source> {
        let mut sources: Vec<Source> = Vec::new();

        for classification_edge in graph.edges_by_label(from, keys::CLASSIFICATION_LABEL, Direction::Out) {
            let vertex_id = classification_edge.target;
            if sources.iter().any(|s| s.vertex == vertex_id) {
                continue;
            }
            let Some(vertex) = graph.vertex(vertex_id) else {
                continue;
            };
            if !crate::retriever::is_propagation_enabled(vertex) {
                continue;
            }

            let type_name = vertex.string_property(keys::TYPE_NAME).unwrap_or_default().to_string();
            if !matches!(self.types.resolve_type(&type_name), Some(TypeDef::Classification(_))) {
                warn!("Classification type {:?} on {} cannot be resolved", type_name, vertex_id);
                report.failures.push(step_failed(
                    &type_name,
                    edge,
                    format!("classification type {:?} of {} not registered", type_name, vertex_id),
                ));
                continue;
            }

            sources.push(Source {
                vertex: vertex_id,
                type_name,
            });
        }
        sources
    }

    /// Recompute the propagated-trait-name marker of `vertex` from its
    /// propagated classification edges
    pub fn refresh_propagated_marker<G: GraphMutator + ?Sized>(
        &self,
        graph: &mut G,
        vertex: VertexId,
    ) -> RepositoryResult<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        for edge in graph.edges_by_label(vertex, keys::CLASSIFICATION_LABEL, Direction::Out) {
            if !is_propagated_edge(edge) {
                continue;
            }
            let name = graph
                .vertex(edge.target)
                .and_then(|v| v.string_property(keys::TYPE_NAME));
            if let Some(name) = name {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }

        if names.is_empty() {
            graph.remove_vertex_property(vertex, keys::PROPAGATED_TRAIT_NAMES)?;
        } else {
            let marker = names.iter().map(|n| PropertyValue::from(n.as_str())).collect();
            graph.set_vertex_property(vertex, keys::PROPAGATED_TRAIT_NAMES, PropertyValue::List(marker))?;
        }
        Ok(names)
    }
}

/// Type names in the propagated-trait-name marker of a vertex
pub fn propagated_trait_names<G: GraphAccessor + ?Sized>(graph: &G, vertex: VertexId) -> Vec<String> {
    graph
        .vertex(vertex)
        .and_then(|v| v.list_property(keys::PROPAGATED_TRAIT_NAMES))
        .map(|names| names.iter().filter_map(|n| n.as_string()).map(String::from).collect())
        .unwrap_or_default()
}

fn relationship_ends<G: GraphAccessor + ?Sized>(
    graph: &G,
    edge: EdgeId,
) -> RepositoryResult<(VertexId, VertexId, Option<String>)> {
    let edge = graph
        .edge(edge)
        .ok_or_else(|| RepositoryError::NotFound(format!("relationship edge {}", edge)))?;
    Ok((
        edge.source,
        edge.target,
        edge.string_property(keys::RELATIONSHIP_GUID).map(String::from),
    ))
}

fn is_propagated_edge<C: PropertyContainer + ?Sized>(edge: &C) -> bool {
    edge.property(keys::IS_PROPAGATED)
        .and_then(|v| v.as_boolean())
        .unwrap_or(false)
}

/// Any classification edge of `vertex` whose classification has `type_name`
fn has_classification<G: GraphAccessor + ?Sized>(graph: &G, vertex: VertexId, type_name: &str) -> bool {
    graph
        .edges_by_label(vertex, keys::CLASSIFICATION_LABEL, Direction::Out)
        .into_iter()
        .filter_map(|e| graph.vertex(e.target))
        .any(|c| c.string_property(keys::TYPE_NAME) == Some(type_name))
}

/// Entity a classification is authoritatively attached to
fn associated_entity<G: GraphAccessor + ?Sized>(graph: &G, classification: VertexId) -> Option<VertexId> {
    let by_guid = graph
        .vertex(classification)
        .and_then(|v| v.string_property(keys::CLASSIFICATION_ENTITY_GUID))
        .and_then(|guid| graph.find_vertex_by_guid(guid));

    by_guid.or_else(|| {
        graph
            .edges_by_label(classification, keys::CLASSIFICATION_LABEL, Direction::In)
            .into_iter()
            .find(|e| !is_propagated_edge(*e))
            .map(|e| e.source)
    })
}

/// Link `vertex` to `classification` with a propagated edge and record the
/// type in its marker
fn attach_propagated<G: GraphMutator + ?Sized>(
    graph: &mut G,
    vertex: VertexId,
    classification: VertexId,
    type_name: &str,
) -> RepositoryResult<EdgeId> {
    let mut properties = PropertyMap::new();
    properties.insert(keys::IS_PROPAGATED.to_string(), PropertyValue::Boolean(true));
    let edge = graph.add_edge(vertex, classification, keys::CLASSIFICATION_LABEL, properties)?;
    add_propagated_trait_name(graph, vertex, type_name)?;
    Ok(edge)
}

fn add_propagated_trait_name<G: GraphMutator + ?Sized>(
    graph: &mut G,
    vertex: VertexId,
    type_name: &str,
) -> RepositoryResult<()> {
    let mut names = propagated_trait_names(&*graph, vertex);
    if names.iter().any(|n| n == type_name) {
        return Ok(());
    }
    names.push(type_name.to_string());
    let marker = names.into_iter().map(PropertyValue::String).collect();
    graph.set_vertex_property(vertex, keys::PROPAGATED_TRAIT_NAMES, PropertyValue::List(marker))?;
    Ok(())
}

fn step_failed(
    classification: &str,
    element: impl Into<crate::graph::ElementId>,
    reason: String,
) -> RepositoryError {
    RepositoryError::PropagationStepFailed {
        classification: classification.to_string(),
        element: element.into(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphStore, InstanceWriter};
    use crate::typesys::{ClassificationTypeDef, EntityTypeDef, TypeRegistry};

    fn types() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types.register_entity(EntityTypeDef::new("Table"));
        types.register_entity(EntityTypeDef::new("Column"));
        types.register_classification(ClassificationTypeDef::new("PII"));
        types.register_classification(ClassificationTypeDef::new("Restricted").applicable_to("Table"));
        types
    }

    fn propagated_edges(store: &GraphStore, vertex: VertexId) -> usize {
        store
            .edges_by_label(vertex, keys::CLASSIFICATION_LABEL, Direction::Out)
            .into_iter()
            .filter(|e| is_propagated_edge(*e))
            .count()
    }

    #[test]
    fn test_add_propagates_downstream() {
        let mut store = GraphStore::new();
        let mut writer = InstanceWriter::new(&mut store);
        let a = writer.create_entity("Table").unwrap();
        let b = writer.create_entity("Table").unwrap();
        let c = writer.create_entity("Table").unwrap();
        writer.add_relationship("Lineage", b, c, PropagateTags::OneToTwo).unwrap();
        writer.add_classification(a, "PII", true).unwrap();
        let edge = writer.add_relationship("Lineage", a, b, PropagateTags::OneToTwo).unwrap();

        let types = types();
        let propagator = ClassificationPropagator::new(&types);
        let report = propagator.on_relationship_added(&mut store, edge, PropagateTags::OneToTwo).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.edges_added.len(), 2);
        assert_eq!(propagated_trait_names(&store, b), vec!["PII"]);
        assert_eq!(propagated_trait_names(&store, c), vec!["PII"]);
        assert!(propagated_trait_names(&store, a).is_empty());
    }

    #[test]
    fn test_add_respects_mode_and_flag() {
        let mut store = GraphStore::new();
        let mut writer = InstanceWriter::new(&mut store);
        let a = writer.create_entity("Table").unwrap();
        let b = writer.create_entity("Table").unwrap();
        writer.add_classification(a, "PII", true).unwrap();
        writer.add_classification(b, "Restricted", false).unwrap();
        let edge = writer.add_relationship("Lineage", a, b, PropagateTags::TwoToOne).unwrap();

        let types = types();
        let propagator = ClassificationPropagator::new(&types);

        // PII would flow a -> b, but the mode only carries b -> a and
        // Restricted on b does not propagate
        let report = propagator.on_relationship_added(&mut store, edge, PropagateTags::TwoToOne).unwrap();
        assert!(report.edges_added.is_empty());
        assert_eq!(propagated_edges(&store, a), 0);
        assert_eq!(propagated_edges(&store, b), 0);
    }

    #[test]
    fn test_add_skips_existing_and_inapplicable() {
        let mut store = GraphStore::new();
        let mut writer = InstanceWriter::new(&mut store);
        let table = writer.create_entity("Table").unwrap();
        let other = writer.create_entity("Table").unwrap();
        let column = writer.create_entity("Column").unwrap();
        writer.add_classification(table, "PII", true).unwrap();
        writer.add_classification(table, "Restricted", true).unwrap();
        writer.add_classification(other, "PII", false).unwrap();
        let to_other = writer.add_relationship("Lineage", table, other, PropagateTags::OneToTwo).unwrap();
        let to_column = writer.add_relationship("Lineage", table, column, PropagateTags::OneToTwo).unwrap();

        let types = types();
        let propagator = ClassificationPropagator::new(&types);

        let report = propagator.on_relationship_added(&mut store, to_other, PropagateTags::OneToTwo).unwrap();
        assert_eq!(report.edges_added.len(), 1);
        assert_eq!(propagated_trait_names(&store, other), vec!["Restricted"]);

        let report = propagator.on_relationship_added(&mut store, to_column, PropagateTags::OneToTwo).unwrap();
        assert_eq!(report.edges_added.len(), 1);
        assert_eq!(propagated_trait_names(&store, column), vec!["PII"]);
    }

    #[test]
    fn test_remove_keeps_reachable() {
        let mut store = GraphStore::new();
        let mut writer = InstanceWriter::new(&mut store);
        let a = writer.create_entity("Table").unwrap();
        let b = writer.create_entity("Table").unwrap();
        let c = writer.create_entity("Table").unwrap();
        writer.add_classification(a, "PII", true).unwrap();
        let a_b = writer.add_relationship("Lineage", a, b, PropagateTags::OneToTwo).unwrap();
        writer.add_relationship("Lineage", b, c, PropagateTags::OneToTwo).unwrap();
        let a_c = writer.add_relationship("Lineage", a, c, PropagateTags::OneToTwo).unwrap();

        let types = types();
        let propagator = ClassificationPropagator::new(&types);
        propagator.on_relationship_added(&mut store, a_b, PropagateTags::OneToTwo).unwrap();
        let report = propagator.on_relationship_added(&mut store, a_c, PropagateTags::OneToTwo).unwrap();
        assert!(report.edges_added.is_empty());

        let report = propagator.on_relationship_removed(&mut store, a_b, PropagateTags::OneToTwo).unwrap();
        store.delete_edge(a_b).unwrap();

        assert_eq!(report.edges_removed.len(), 1);
        assert_eq!(propagated_edges(&store, b), 0);
        assert!(propagated_trait_names(&store, b).is_empty());
        // still reached through a -> c
        assert_eq!(propagated_edges(&store, c), 1);
        assert_eq!(propagated_trait_names(&store, c), vec!["PII"]);
    }

    #[test]
    fn test_remove_relinks_to_other_owner() {
        let mut store = GraphStore::new();
        let mut writer = InstanceWriter::new(&mut store);
        let a = writer.create_entity("Table").unwrap();
        let b = writer.create_entity("Table").unwrap();
        let c = writer.create_entity("Table").unwrap();
        let d = writer.create_entity("Table").unwrap();
        writer.add_classification(a, "PII", true).unwrap();
        let pii_b = writer.add_classification(b, "PII", true).unwrap();
        writer.add_relationship("Lineage", c, d, PropagateTags::OneToTwo).unwrap();
        let a_c = writer.add_relationship("Lineage", a, c, PropagateTags::OneToTwo).unwrap();
        let b_c = writer.add_relationship("Lineage", b, c, PropagateTags::OneToTwo).unwrap();

        let types = types();
        let propagator = ClassificationPropagator::new(&types);
        propagator.on_relationship_added(&mut store, a_c, PropagateTags::OneToTwo).unwrap();
        let report = propagator.on_relationship_added(&mut store, b_c, PropagateTags::OneToTwo).unwrap();
        assert!(report.edges_added.is_empty());

        let report = propagator.on_relationship_removed(&mut store, a_c, PropagateTags::OneToTwo).unwrap();
        store.delete_edge(a_c).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.edges_removed.len(), 2);
        assert_eq!(report.edges_added.len(), 2);
        for vertex in [c, d] {
            let targets: Vec<VertexId> = store
                .edges_by_label(vertex, keys::CLASSIFICATION_LABEL, Direction::Out)
                .into_iter()
                .filter(|e| is_propagated_edge(*e))
                .map(|e| e.target)
                .collect();
            assert_eq!(targets, vec![pii_b]);
            assert_eq!(propagated_trait_names(&store, vertex), vec!["PII"]);
        }
    }

    #[test]
    fn test_unknown_classification_type_reported() {
        let mut store = GraphStore::new();
        let mut writer = InstanceWriter::new(&mut store);
        let a = writer.create_entity("Table").unwrap();
        let b = writer.create_entity("Table").unwrap();
        writer.add_classification(a, "Retired", true).unwrap();
        writer.add_classification(a, "PII", true).unwrap();
        let edge = writer.add_relationship("Lineage", a, b, PropagateTags::OneToTwo).unwrap();

        let types = types();
        let propagator = ClassificationPropagator::new(&types);
        let report = propagator.on_relationship_added(&mut store, edge, PropagateTags::OneToTwo).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            &report.failures[0],
            RepositoryError::PropagationStepFailed { classification, .. } if classification == "Retired"
        ));
        assert_eq!(propagated_trait_names(&store, b), vec!["PII"]);
    }

    #[test]
    fn test_missing_edge() {
        let mut store = GraphStore::new();
        let types = types();
        let propagator = ClassificationPropagator::new(&types);
        let err = propagator
            .on_relationship_added(&mut store, EdgeId::new(42), PropagateTags::Both)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[test]
    fn test_refresh_marker() {
        let mut store = GraphStore::new();
        let mut writer = InstanceWriter::new(&mut store);
        let a = writer.create_entity("Table").unwrap();
        writer.add_classification(a, "PII", false).unwrap();
        store
            .set_vertex_property(a, keys::PROPAGATED_TRAIT_NAMES, PropertyValue::List(vec!["Stale".into()]))
            .unwrap();

        let types = types();
        let propagator = ClassificationPropagator::new(&types);
        assert!(propagator.refresh_propagated_marker(&mut store, a).unwrap().is_empty());
        assert!(store.get_vertex(a).unwrap().get_property(keys::PROPAGATED_TRAIT_NAMES).is_none());
    }
}
