//! The traversal engine: one pass over a document and its nested frames.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::ExtractionConfig;
use crate::driver::{ElementHandle, FrameContext};
use crate::error::{DriverError, ScoutError};
use crate::facts::ElementFacts;
use crate::inventory::{ElementDescriptor, Inventory};
use crate::locator::LocatorGenerator;
use crate::name::NameExtractor;
use crate::scripts::CANDIDATE_SELECTOR;
use crate::visibility::VisibilityEvaluator;

/// Counters for one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PassReport {
    pub frames_visited: usize,
    pub frames_abandoned: usize,
    pub candidates: usize,
    pub committed: usize,
    pub hidden: usize,
    pub without_locator: usize,
    pub stale: usize,
    pub superseded_parents: usize,
    pub candidate_errors: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// What happened to a single candidate.
enum Outcome {
    Hidden,
    NoLocator,
    Stale { superseded: bool },
    Committed {
        superseded: bool,
        frame: Option<Arc<dyn FrameContext>>,
    },
}

/// Walks documents and writes qualifying elements into an [`Inventory`].
pub struct Traversal {
    config: ExtractionConfig,
    inventory: Inventory,
    visibility: VisibilityEvaluator,
    locators: LocatorGenerator,
    names: NameExtractor,
}

impl Traversal {
    pub fn new(config: ExtractionConfig, inventory: Inventory) -> Self {
        Self {
            visibility: VisibilityEvaluator::new(config.min_element_size),
            locators: LocatorGenerator::new(),
            names: NameExtractor::new(config.name_max_length),
            config,
            inventory,
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Run one pass over `root` and every reachable nested frame.
    ///
    /// Returns an error only when the root document itself becomes unusable.
    /// Nested frames that fail are abandoned and counted.
    pub async fn run_pass(&self, root: Arc<dyn FrameContext>) -> Result<PassReport, ScoutError> {
        let started = Instant::now();
        let mut report = PassReport::default();
        let mut worklist: Vec<(Arc<dyn FrameContext>, usize)> = vec![(root, 0)];

        while let Some((frame, depth)) = worklist.pop() {
            match self.scan_frame(frame.as_ref(), depth, &mut worklist, &mut report).await {
                Ok(()) => report.frames_visited += 1,
                Err(e) if depth == 0 => {
                    warn!("Root document failed mid-pass: {}", e);
                    return Err(e.into());
                }
                Err(e) => {
                    warn!("Abandoning frame {} at depth {}: {}", frame.label(), depth, e);
                    report.frames_abandoned += 1;
                }
            }
        }

        report.elapsed = started.elapsed();
        debug!(
            "Pass complete in {:?}: {} frame(s), {} candidate(s), {} committed, {} superseded, inventory size {}",
            report.elapsed,
            report.frames_visited,
            report.candidates,
            report.committed,
            report.superseded_parents,
            self.inventory.len()
        );
        Ok(report)
    }

    async fn scan_frame(
        &self,
        frame: &dyn FrameContext,
        depth: usize,
        worklist: &mut Vec<(Arc<dyn FrameContext>, usize)>,
        report: &mut PassReport,
    ) -> Result<(), DriverError> {
        let candidates = frame.query_all(CANDIDATE_SELECTOR).await?;
        trace!("Frame {}: {} candidate(s)", frame.label(), candidates.len());

        for candidate in candidates {
            report.candidates += 1;
            match self.process(candidate.as_ref(), frame).await {
                Ok(Outcome::Hidden) => report.hidden += 1,
                Ok(Outcome::NoLocator) => report.without_locator += 1,
                Ok(Outcome::Stale { superseded }) => {
                    report.stale += 1;
                    report.superseded_parents += usize::from(superseded);
                }
                Ok(Outcome::Committed { superseded, frame: nested }) => {
                    report.committed += 1;
                    report.superseded_parents += usize::from(superseded);
                    if let Some(nested) = nested {
                        if depth < self.config.max_frame_depth {
                            worklist.push((nested, depth + 1));
                        } else {
                            debug!("Not descending into {}: depth limit reached", nested.label());
                        }
                    }
                }
                Err(e) if e.is_context_lost() => return Err(e),
                Err(e) => {
                    trace!("Skipping candidate: {}", e);
                    report.candidate_errors += 1;
                }
            }
        }

        Ok(())
    }

    async fn process(
        &self,
        candidate: &dyn ElementHandle,
        frame: &dyn FrameContext,
    ) -> Result<Outcome, DriverError> {
        if !self.visibility.qualifies(candidate).await {
            return Ok(Outcome::Hidden);
        }

        let facts = match ElementFacts::collect(candidate).await {
            Ok(facts) => facts,
            Err(e) if e.is_context_lost() => return Err(e),
            Err(e) => {
                trace!("Facts probe failed: {}", e);
                return Ok(Outcome::NoLocator);
            }
        };
        let locator = match self.locators.from_facts(&facts, frame).await {
            Ok(locator) => locator,
            Err(e) if e.is_context_lost() => return Err(e),
            Err(e) => {
                trace!("Locator generation failed for <{}>: {}", facts.tag, e);
                return Ok(Outcome::NoLocator);
            }
        };

        // Must happen before the commit below.
        let superseded = self.supersede_parent(candidate, frame).await?;

        let count = frame.count_matches(&locator).await?;
        if count == 0 {
            trace!("Locator {} matches nothing, skipping", locator);
            return Ok(Outcome::Stale { superseded });
        }

        let name = self.names.extract(&facts);
        trace!("Commit {} ({} match(es)): {}", locator, count, name);
        self.inventory.upsert(ElementDescriptor { locator, name, count });

        let nested = if facts.embeds_frame() {
            candidate.content_frame().await.unwrap_or_else(|e| {
                trace!("Frame content unavailable: {}", e);
                None
            })
        } else {
            None
        };

        Ok(Outcome::Committed { superseded, frame: nested })
    }

    /// Remove the candidate's parent from the inventory if it is stored and
    /// still qualifies. The child is the more specific target.
    async fn supersede_parent(
        &self,
        candidate: &dyn ElementHandle,
        frame: &dyn FrameContext,
    ) -> Result<bool, DriverError> {
        let Some(parent) = candidate.parent().await? else {
            return Ok(false);
        };

        let conflicting = self.stored_qualifying_locator(parent.as_ref(), frame).await;
        if let Err(e) = parent.dispose().await {
            trace!("Failed to dispose parent handle: {}", e);
        }

        match conflicting {
            Some(locator) => {
                trace!("Child supersedes parent {}", locator);
                Ok(self.inventory.remove(&locator).is_some())
            }
            None => Ok(false),
        }
    }

    async fn stored_qualifying_locator(
        &self,
        parent: &dyn ElementHandle,
        frame: &dyn FrameContext,
    ) -> Option<String> {
        let locator = self.locators.generate(parent, frame).await?;
        if !self.inventory.contains(&locator) {
            return None;
        }
        self.visibility.qualifies(parent).await.then_some(locator)
    }
}
