use crate::graph::{DataFlowTracer, GraphStore, HotspotClassifier, RelationshipExplorer};
use crate::models::{ChangeSet, RiskCategory, SecurityContext};

/// Builds one `SecurityContext` per changeset by running the explorer, the
/// classifier and the tracer against the graph store.
pub struct SecurityContextBuilder<'a> {
    store: &'a GraphStore,
    relation_depth: u32,
    flow_depth: u32,
}

impl<'a> SecurityContextBuilder<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self {
            store,
            relation_depth: super::explorer::DEFAULT_RELATION_DEPTH,
            flow_depth: super::tracer::DEFAULT_FLOW_DEPTH,
        }
    }

    pub fn with_depths(store: &'a GraphStore, relation_depth: u32, flow_depth: u32) -> Self {
        Self {
            store,
            relation_depth,
            flow_depth,
        }
    }

    pub fn build(&self, change: &ChangeSet) -> SecurityContext {
        let seeds = change.components();
        if seeds.is_empty() {
            tracing::warn!("changeset names no affected components; context will be empty");
        }

        let explorer = RelationshipExplorer::with_max_depth(self.store, self.relation_depth);
        let related_components = explorer.related_to_all(seeds.iter());

        // Classification covers the seeds and everything in their blast
        // radius, so a risky neighbor of a changed component surfaces too.
        let mut scope = related_components.clone();
        scope.extend(seeds.iter().cloned());

        let classifier = HotspotClassifier::new(self.store);
        let classification = classifier.classify(&scope);

        // Components on the network surface are treated as the external
        // dependencies of this change.
        let external_dependencies = classification
            .hotspots
            .iter()
            .filter(|h| {
                h.risk_factors
                    .iter()
                    .any(|f| f.contains(&RiskCategory::Network.to_string()))
            })
            .map(|h| h.component.clone())
            .collect();

        let tracer = DataFlowTracer::with_max_depth(self.store, self.flow_depth);
        let data_flows = tracer.trace_flows(&seeds);

        tracing::info!(
            related = related_components.len(),
            hotspots = classification.hotspots.len(),
            vectors = classification.attack_vectors.len(),
            flows = data_flows.len(),
            "security context built"
        );

        SecurityContext {
            related_components,
            security_hotspots: classification.hotspots,
            data_flows,
            external_dependencies,
            attack_vectors: classification.attack_vectors,
            privilege_escalation_paths: classification.escalation_paths,
        }
    }
}
