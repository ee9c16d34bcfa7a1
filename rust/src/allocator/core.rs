//! Weekly allocator: validates a request and runs the four placement stages.

use chrono::NaiveTime;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::config::AllocatorConfig;
use crate::interner::{ChildId, ChildInterner};
use crate::models::{
    AllocationRequest, AllocationResult, ConfigIssue, Occupant, SubjectSpec, UnscheduledEntry,
};
use crate::{log_changes, log_checks, log_debug};

use super::commitments::place_commitments;
use super::days::{weekday_name, DaySet};
use super::distributor::{target_days, MAX_SESSIONS_PER_WEEK};
use super::grid::Grid;
use super::slot_fit::find_slot;
use super::window::{SlotWindow, MINUTES_PER_DAY};

/// Configuration errors. Running out of room is never one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("Invalid time window: {0}")]
    InvalidWindow(String),
    #[error("No active days selected")]
    EmptyDaySet,
    #[error("No children declared")]
    EmptyChildren,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Commitment {label:?} is outside the window: {reason}")]
    CommitmentOutOfWindow { label: String, reason: String },
    #[error("Commitment {label:?} collides with {holder:?} for {child} on {day} at {time}")]
    CommitmentCollision {
        label: String,
        child: String,
        day: String,
        time: String,
        holder: String,
    },
}

/// Stable category of an [`AllocationError`], as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidWindow,
    EmptyDaySet,
    EmptyChildren,
    InvalidRequest,
    CommitmentOutOfWindow,
    CommitmentCollision,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidWindow => "InvalidWindow",
            Self::EmptyDaySet => "EmptyDaySet",
            Self::EmptyChildren => "EmptyChildren",
            Self::InvalidRequest => "InvalidRequest",
            Self::CommitmentOutOfWindow => "CommitmentOutOfWindow",
            Self::CommitmentCollision => "CommitmentCollision",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AllocationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidWindow(_) => ErrorKind::InvalidWindow,
            Self::EmptyDaySet => ErrorKind::EmptyDaySet,
            Self::EmptyChildren => ErrorKind::EmptyChildren,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::CommitmentOutOfWindow { .. } => ErrorKind::CommitmentOutOfWindow,
            Self::CommitmentCollision { .. } => ErrorKind::CommitmentCollision,
        }
    }
}

impl From<&AllocationError> for ConfigIssue {
    fn from(err: &AllocationError) -> Self {
        ConfigIssue {
            kind: err.kind().as_str().to_string(),
            detail: err.to_string(),
        }
    }
}

/// A session that could not be placed, before names are resolved for output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unscheduled {
    pub subject: usize,
    pub child: Option<ChildId>,
}

/// Internal outcome of a run, still indexed by day and child IDs.
#[derive(Clone, Debug)]
pub struct Allocation {
    pub grid: Grid,
    pub unscheduled: Vec<Unscheduled>,
    pub errors: Vec<AllocationError>,
}

/// Source ID recorded on every cell of one subject session.
pub fn session_source_id(subject: usize, session: usize) -> String {
    format!("subject:{}:{}", subject, session)
}

/// One-shot allocator over a validated request.
///
/// Borrowing the request keeps every run independent: nothing survives from
/// one call to the next, so regenerating always starts from an empty grid.
pub struct WeeklyAllocator<'a> {
    request: &'a AllocationRequest,
    days: DaySet,
    children: ChildInterner,
    window: SlotWindow,
    verbosity: u8,
}

impl<'a> WeeklyAllocator<'a> {
    /// Validate the request-level inputs.
    ///
    /// Collects every request-level problem rather than stopping at the first.
    pub fn new(
        request: &'a AllocationRequest,
        config: &AllocatorConfig,
    ) -> Result<Self, Vec<AllocationError>> {
        let mut errors = Vec::new();

        let window = SlotWindow::new(&request.window).map_err(|e| errors.push(e)).ok();
        let days = DaySet::parse(&request.day_set).map_err(|e| errors.push(e)).ok();
        let children = if request.children.is_empty() {
            errors.push(AllocationError::EmptyChildren);
            None
        } else {
            ChildInterner::from_names(&request.children)
                .map_err(|name| {
                    errors.push(AllocationError::InvalidRequest(format!(
                        "child {:?} declared more than once",
                        name
                    )))
                })
                .ok()
        };

        match (window, days, children) {
            (Some(window), Some(days), Some(children)) => Ok(Self {
                request,
                days,
                children,
                window,
                verbosity: config.verbosity,
            }),
            _ => Err(errors),
        }
    }

    pub fn days(&self) -> &DaySet {
        &self.days
    }

    pub fn children(&self) -> &ChildInterner {
        &self.children
    }

    pub fn window(&self) -> &SlotWindow {
        &self.window
    }

    /// Run all stages on a fresh grid.
    pub fn run(&self) -> Allocation {
        let verbosity = self.verbosity;

        // Stage 1: empty grid
        let mut grid = Grid::empty(
            self.days.len(),
            self.children.len(),
            self.window.slot_count(),
        );

        // Stage 2: hard reservations
        let mut errors = place_commitments(
            &mut grid,
            &self.request.commitments,
            &self.days,
            &self.children,
            &self.window,
            verbosity,
        );

        // Stages 3 and 4: subjects in input order
        let mut unscheduled = Vec::new();
        for (index, subject) in self.request.subjects.iter().enumerate() {
            match self.schedule_subject(&mut grid, index, subject) {
                Ok(mut missed) => unscheduled.append(&mut missed),
                Err(err) => {
                    log_checks!(verbosity, "  Skipping subject {}: {}", subject.name, err);
                    errors.push(err);
                }
            }
        }

        Allocation {
            grid,
            unscheduled,
            errors,
        }
    }

    /// Place every session of one subject, returning those that did not fit.
    fn schedule_subject(
        &self,
        grid: &mut Grid,
        index: usize,
        subject: &SubjectSpec,
    ) -> Result<Vec<Unscheduled>, AllocationError> {
        if subject.duration_minutes <= 0 {
            return Err(AllocationError::InvalidRequest(format!(
                "subject {:?} has non-positive duration {}",
                subject.name, subject.duration_minutes
            )));
        }
        if subject.duration_minutes > MINUTES_PER_DAY {
            return Err(AllocationError::InvalidRequest(format!(
                "subject {:?} lasts {} minutes, longer than a day",
                subject.name, subject.duration_minutes
            )));
        }
        if subject.sessions_per_week > MAX_SESSIONS_PER_WEEK {
            return Err(AllocationError::InvalidRequest(format!(
                "subject {:?} asks for {} sessions, more than a week can hold",
                subject.name, subject.sessions_per_week
            )));
        }

        let participants = self
            .children
            .resolve_participants(&subject.participants)
            .map_err(|name| {
                AllocationError::InvalidRequest(format!(
                    "subject {:?} names unknown child {:?}",
                    subject.name, name
                ))
            })?;

        let blocks = self.window.blocks_for(subject.duration_minutes);
        let targets = target_days(self.days.len(), subject.sessions_per_week);
        let shared = participants.len() > 1 && subject.shared != Some(false);

        log_debug!(
            self.verbosity,
            "Subject {} ({} block(s), shared={}): target days {:?}",
            subject.name,
            blocks,
            shared,
            targets
        );

        let mut missed = Vec::new();
        if shared {
            for (session, &preferred) in targets.iter().enumerate() {
                let placed = self.place_session(
                    grid,
                    index,
                    session,
                    subject,
                    &participants,
                    blocks,
                    preferred,
                    true,
                );
                if !placed {
                    missed.push(Unscheduled {
                        subject: index,
                        child: None,
                    });
                }
            }
        } else {
            for &child in &participants {
                for (session, &preferred) in targets.iter().enumerate() {
                    let placed = self.place_session(
                        grid,
                        index,
                        session,
                        subject,
                        &[child],
                        blocks,
                        preferred,
                        false,
                    );
                    if !placed {
                        missed.push(Unscheduled {
                            subject: index,
                            child: Some(child),
                        });
                    }
                }
            }
        }

        Ok(missed)
    }

    /// Try to place one session; `false` means it is unscheduled.
    #[allow(clippy::too_many_arguments)]
    fn place_session(
        &self,
        grid: &mut Grid,
        index: usize,
        session: usize,
        subject: &SubjectSpec,
        participants: &[ChildId],
        blocks: usize,
        preferred: usize,
        shared: bool,
    ) -> bool {
        let verbosity = self.verbosity;
        let who = self.participant_names(participants);

        log_checks!(
            verbosity,
            "  Session {} of {} for {} prefers {}",
            session + 1,
            subject.name,
            who,
            weekday_name(self.days.day(preferred))
        );

        let Some((day, start)) = find_slot(grid, participants, blocks, preferred, verbosity) else {
            log_changes!(
                verbosity,
                "  Unscheduled {} for {}: no free run of {} block(s) this week",
                subject.name,
                who,
                blocks
            );
            return false;
        };

        if day != preferred {
            log_checks!(
                verbosity,
                "    {} full, moved to {}",
                weekday_name(self.days.day(preferred)),
                weekday_name(self.days.day(day))
            );
        }

        let occupant = Occupant {
            source_id: session_source_id(index, session),
            label: subject.name.clone(),
            is_session_start: true,
            shared,
            fixed: false,
        };

        // find_slot only returns runs that are free for every participant
        let reserved = grid.reserve(day, participants, start, blocks, &occupant);
        debug_assert!(reserved.is_ok(), "slot search returned a taken run: {:?}", reserved);
        if reserved.is_err() {
            return false;
        }

        log_changes!(
            verbosity,
            "  Placed {} for {} on {} at {}",
            subject.name,
            who,
            weekday_name(self.days.day(day)),
            self.window.slot_start(start).format("%H:%M")
        );
        true
    }

    fn participant_names(&self, participants: &[ChildId]) -> String {
        participants
            .iter()
            .filter_map(|&id| self.children.resolve(id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Resolve an [`Allocation`] into the name-keyed output record.
    pub fn into_result(&self, allocation: Allocation) -> AllocationResult {
        let day_names = self.days.names();

        let mut grid = BTreeMap::new();
        for (day, day_name) in day_names.iter().enumerate() {
            let mut per_child = BTreeMap::new();
            for child in self.children.ids() {
                if let Some(name) = self.children.resolve(child) {
                    per_child.insert(name.to_string(), allocation.grid.column(day, child).to_vec());
                }
            }
            grid.insert(day_name.clone(), per_child);
        }

        let unscheduled = allocation
            .unscheduled
            .iter()
            .map(|u| UnscheduledEntry {
                name: self.request.subjects[u.subject].name.clone(),
                child: u
                    .child
                    .and_then(|c| self.children.resolve(c))
                    .map(|s| s.to_string()),
            })
            .collect();

        let slot_times: Vec<NaiveTime> = self.window.slot_times();

        AllocationResult {
            grid,
            unscheduled,
            errors: allocation.errors.iter().map(ConfigIssue::from).collect(),
            days: day_names,
            children: self.children.names().to_vec(),
            slot_times,
            block_minutes: self.window.block_minutes(),
        }
    }
}

/// Allocate a week for `request`.
///
/// Never fails: configuration problems come back in `errors` (a rejected
/// request has an empty grid), and sessions that do not fit come back in
/// `unscheduled`. Identical requests always produce identical results.
pub fn allocate(request: &AllocationRequest, config: &AllocatorConfig) -> AllocationResult {
    let allocator = match WeeklyAllocator::new(request, config) {
        Ok(allocator) => allocator,
        Err(errors) => {
            log_checks!(config.verbosity, "Request rejected with {} error(s)", errors.len());
            return rejected(&errors);
        }
    };

    let allocation = allocator.run();
    allocator.into_result(allocation)
}

/// Result for a request that never reached placement.
fn rejected(errors: &[AllocationError]) -> AllocationResult {
    AllocationResult {
        errors: errors.iter().map(ConfigIssue::from).collect(),
        ..AllocationResult::default()
    }
}
