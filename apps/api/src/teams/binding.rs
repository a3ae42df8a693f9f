//! Team binding: assigning teams to resolved seat slots.
//!
//! Default: `IndexBinder` (team i takes seat i).
//! Alternative: `NearestSeatBinder` (teams with a known location keep the
//! closest free seat, everyone else fills the remaining seats in order).
//!
//! `AppState` holds an `Arc<dyn SeatBinder>`, picked at startup via config.

use std::sync::Arc;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::layout::RotationCoordinate;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A team as supplied by the external team source. Only `label` (for font
/// sizing) and `location` are interpreted; `id` is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: Value,
    pub label: String,
    #[serde(default)]
    pub location: Option<RotationCoordinate>,
}

impl Team {
    /// The location this team already occupies, if any. An all-zero
    /// location means "never placed".
    pub fn known_location(&self) -> Option<RotationCoordinate> {
        self.location
            .filter(|l| l.x != 0.0 || l.y != 0.0 || l.rotation != 0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatedTeam {
    pub seat: usize,
    pub team: Team,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingReport {
    /// Seated teams in seat order, each with its location overwritten by the seat.
    pub seated: Vec<SeatedTeam>,
    /// Teams left over when there are more teams than seats.
    pub unseated: Vec<Team>,
    /// Indices of seats nobody took.
    pub empty_seats: Vec<usize>,
    pub binder: String,
}

/// True when any team carries a non-zero location.
pub fn has_locations(teams: &[Team]) -> bool {
    teams.iter().any(|t| t.known_location().is_some())
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The binding strategy trait. Implement this to change how teams land on
/// seats without touching handlers.
pub trait SeatBinder: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns, for every team in input order, the seat index it takes (or
    /// `None` when it stays unseated). No seat index may repeat.
    fn assign(&self, teams: &[Team], seats: &[RotationCoordinate]) -> Vec<Option<usize>>;

    fn bind(&self, teams: Vec<Team>, seats: &[RotationCoordinate]) -> BindingReport {
        let assignment = self.assign(&teams, seats);
        build_report(self.name(), teams, assignment, seats)
    }
}

pub fn binder_from_name(name: &str) -> Result<Arc<dyn SeatBinder>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "index" => Ok(Arc::new(IndexBinder)),
        "nearest" => Ok(Arc::new(NearestSeatBinder)),
        other => bail!("Unknown team binder '{other}' (expected 'index' or 'nearest')"),
    }
}

fn build_report(
    binder: &str,
    teams: Vec<Team>,
    assignment: Vec<Option<usize>>,
    seats: &[RotationCoordinate],
) -> BindingReport {
    let mut taken = vec![false; seats.len()];
    let mut seated = Vec::new();
    let mut unseated = Vec::new();

    for (mut team, slot) in teams.into_iter().zip(assignment) {
        match slot {
            Some(seat) if seat < seats.len() && !taken[seat] => {
                taken[seat] = true;
                team.location = Some(seats[seat]);
                seated.push(SeatedTeam { seat, team });
            }
            _ => unseated.push(team),
        }
    }
    seated.sort_by_key(|s| s.seat);

    let empty_seats = taken
        .iter()
        .enumerate()
        .filter(|(_, t)| !**t)
        .map(|(i, _)| i)
        .collect();

    BindingReport {
        seated,
        unseated,
        empty_seats,
        binder: binder.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// IndexBinder
// ────────────────────────────────────────────────────────────────────────────

/// Zips teams to seats by index.
pub struct IndexBinder;

impl SeatBinder for IndexBinder {
    fn name(&self) -> &'static str {
        "index"
    }

    fn assign(&self, teams: &[Team], seats: &[RotationCoordinate]) -> Vec<Option<usize>> {
        (0..teams.len())
            .map(|i| (i < seats.len()).then_some(i))
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// NearestSeatBinder
// ────────────────────────────────────────────────────────────────────────────

/// Keeps placed teams near where they were, so small map edits do not
/// reshuffle everyone.
///
/// Pass 1: each team with a known location, in input order, claims the
/// closest free seat. Pass 2: the remaining teams fill free seats in index
/// order.
pub struct NearestSeatBinder;

impl SeatBinder for NearestSeatBinder {
    fn name(&self) -> &'static str {
        "nearest"
    }

    fn assign(&self, teams: &[Team], seats: &[RotationCoordinate]) -> Vec<Option<usize>> {
        let mut free = vec![true; seats.len()];
        let mut assignment = vec![None; teams.len()];

        for (i, team) in teams.iter().enumerate() {
            let Some(location) = team.known_location() else {
                continue;
            };
            let nearest = seats
                .iter()
                .enumerate()
                .filter(|(s, _)| free[*s])
                .min_by(|(_, a), (_, b)| {
                    let da = a.position().distance_to(location.position());
                    let db = b.position().distance_to(location.position());
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(s, _)| s);
            if let Some(seat) = nearest {
                free[seat] = false;
                assignment[i] = Some(seat);
            }
        }

        let mut next_free = free
            .iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(|(s, _)| s)
            .collect::<Vec<_>>()
            .into_iter();
        for slot in assignment.iter_mut().filter(|a| a.is_none()) {
            *slot = next_free.next();
        }
        assignment
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
