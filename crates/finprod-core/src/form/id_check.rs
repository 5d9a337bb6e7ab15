// ── Id availability check ──
//
// Each edit of the id field bumps a generation counter. A verification
// result carries the generation it was issued for; results for an older
// generation are dropped, so only the latest input decides validity.

/// Handed out when a verification request is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCheckTicket {
    pub generation: u64,
    pub id: String,
}

/// Where the availability check stands for the current id value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
pub enum IdCheckStatus {
    /// Nothing has been asked yet for this value.
    #[default]
    Unchecked,
    /// A request is in flight.
    Pending,
    Available,
    Taken,
}

#[derive(Debug, Default)]
pub(crate) struct IdCheck {
    generation: u64,
    status: IdCheckStatus,
    /// Last answer received, keyed by the id it was for.
    resolved: Option<(String, bool)>,
}

impl IdCheck {
    pub(crate) fn status(&self) -> IdCheckStatus {
        self.status
    }

    /// The id field changed to `value`.
    pub(crate) fn invalidate(&mut self, value: &str) {
        self.generation += 1;
        self.status = match &self.resolved {
            Some((id, exists)) if id == value => status_for(*exists),
            _ => IdCheckStatus::Unchecked,
        };
    }

    /// Issue a ticket for `id`, or `None` when the answer is already known.
    pub(crate) fn begin(&mut self, id: &str) -> Option<IdCheckTicket> {
        if let Some((resolved, exists)) = &self.resolved {
            if resolved == id {
                self.status = status_for(*exists);
                return None;
            }
        }
        self.status = IdCheckStatus::Pending;
        Some(IdCheckTicket {
            generation: self.generation,
            id: id.to_owned(),
        })
    }

    /// Record an answer. Returns `false` if the ticket is stale.
    pub(crate) fn finish(&mut self, ticket: &IdCheckTicket, exists: bool) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.resolved = Some((ticket.id.clone(), exists));
        self.status = status_for(exists);
        true
    }

    pub(crate) fn reset(&mut self) {
        self.generation += 1;
        self.status = IdCheckStatus::Unchecked;
        self.resolved = None;
    }
}

fn status_for(exists: bool) -> IdCheckStatus {
    if exists {
        IdCheckStatus::Taken
    } else {
        IdCheckStatus::Available
    }
}
