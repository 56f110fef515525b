use crate::config::Settings;
use crate::core::{
    aggregate::aggregate,
    capacity::{distribute_capacity, slot_total},
    matrix::CompatibilityMatrix,
    ports::{EmbeddingProvider, MatchingSolver},
    projector::project,
    schema::AttributeSchema,
    scoring::score_attribute,
    slots::SlotGraph,
    solver::HungarianSolver,
};
use crate::error::{MatchError, Result};
use crate::models::{Assignments, Cohorts, MatchSummary};
use crate::services::build_embedder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, info_span};

/// Result of a matching run
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub assignments: Assignments,
    pub summary: MatchSummary,
}

/// Aggregate compatibility plus the attributes that had to be zeroed
#[derive(Debug, Clone)]
pub struct Compatibility {
    pub matrix: CompatibilityMatrix,
    pub degraded: Vec<String>,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Split the table into mentors and mentees
/// 2. Score every weighted attribute and blend the matrices
/// 3. Distribute slots on each side
/// 4. Build the slot graph
/// 5. Solve the matching and project it back onto participants
#[derive(Clone)]
pub struct MatchMaker {
    schema: AttributeSchema,
    max_connections: usize,
    deduplicate_pairs: bool,
    embedder: Arc<dyn EmbeddingProvider>,
    solver: Arc<dyn MatchingSolver>,
}

impl MatchMaker {
    pub fn new(schema: AttributeSchema, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            schema,
            max_connections: 2,
            deduplicate_pairs: false,
            embedder,
            solver: Arc::new(HungarianSolver::new()),
        }
    }

    /// Build the matcher described by the settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let schema = AttributeSchema::from_settings(&settings.schema)?;
        let embedder = build_embedder(&settings.embedding)
            .map_err(|e| MatchError::Configuration(e.to_string()))?;

        Ok(Self::new(schema, embedder)
            .with_max_connections(settings.matching.max_connections)
            .with_deduplication(settings.matching.deduplicate_pairs))
    }

    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_deduplication(mut self, deduplicate: bool) -> Self {
        self.deduplicate_pairs = deduplicate;
        self
    }

    pub fn with_solver(mut self, solver: Arc<dyn MatchingSolver>) -> Self {
        self.solver = solver;
        self
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    /// Run the whole pipeline on raw survey records
    pub fn run<R: Rng + ?Sized>(
        &self,
        records: &[Map<String, Value>],
        rng: &mut R,
    ) -> Result<MatchOutcome> {
        let span = info_span!("matching_run", run_id = %uuid::Uuid::new_v4());
        let _guard = span.enter();

        info!(records = records.len(), "Starting matching run");
        let cohorts = self.schema.split_cohorts(records)?;
        self.run_cohorts(&cohorts, rng)
    }

    /// Run the pipeline on already split cohorts
    pub fn run_cohorts<R: Rng + ?Sized>(&self, cohorts: &Cohorts, rng: &mut R) -> Result<MatchOutcome> {
        if cohorts.mentors.is_empty() {
            return Err(MatchError::NoMentors);
        }
        if cohorts.mentees.is_empty() {
            return Err(MatchError::NoMentees);
        }

        let compatibility = self.compatibility(cohorts)?;

        let total = slot_total(cohorts.mentors.len(), cohorts.mentees.len(), self.max_connections);
        let mentee_capacity = distribute_capacity(cohorts.mentees.len(), total, self.max_connections, rng)?;
        let mentor_capacity = distribute_capacity(cohorts.mentors.len(), total, self.max_connections, rng)?;
        debug!(slots = total, max_connections = self.max_connections, "Distributed capacity");

        let graph = SlotGraph::build(&compatibility.matrix, &mentee_capacity, &mentor_capacity, rng)?;
        debug!(edges = graph.edges().len(), "Built slot graph");

        let pairs = self.solver.solve(&graph)?;
        graph.validate_matching(&pairs)?;

        let total_weight: f64 = pairs.iter().filter_map(|&p| graph.weight(p)).sum();
        let assignments = project(&graph, &pairs, cohorts, self.deduplicate_pairs);

        let summary = MatchSummary {
            mentors: cohorts.mentors.len(),
            mentees: cohorts.mentees.len(),
            slots_per_cohort: total,
            edges: graph.edges().len(),
            matched_pairs: pairs.len(),
            total_weight,
            degraded_attributes: compatibility.degraded,
        };

        info!(
            mentors = summary.mentors,
            mentees = summary.mentees,
            matched_pairs = summary.matched_pairs,
            total_weight = summary.total_weight,
            solver = self.solver.name(),
            "Matching run complete"
        );

        Ok(MatchOutcome {
            assignments,
            summary,
        })
    }

    /// Score every weighted attribute and blend them into one matrix
    pub fn compatibility(&self, cohorts: &Cohorts) -> Result<Compatibility> {
        let scored: Vec<_> = self
            .schema
            .attributes()
            .iter()
            .map(|attribute| score_attribute(attribute, cohorts, self.embedder.as_ref()))
            .collect();

        let degraded = scored
            .iter()
            .filter(|s| s.degraded.is_some())
            .map(|s| s.name.clone())
            .collect();

        let matrix = aggregate(&self.schema, &scored, cohorts.mentees.len(), cohorts.mentors.len())?;

        Ok(Compatibility { matrix, degraded })
    }
}

impl std::fmt::Debug for MatchMaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchMaker")
            .field("attributes", &self.schema.attributes().len())
            .field("max_connections", &self.max_connections)
            .field("deduplicate_pairs", &self.deduplicate_pairs)
            .field("embedder", &self.embedder.name())
            .field("solver", &self.solver.name())
            .finish()
    }
}

/// Random source for a run: seeded when reproducibility is wanted
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
