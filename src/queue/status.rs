use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Waiting,
    Ready,
    Called,
    Seated,
    Done,
    Cancelled,
    NoShow,
}

impl QueueStatus {
    /// Statuses that still occupy a place in the live queue.
    pub const ACTIVE: [QueueStatus; 3] = [Self::Waiting, Self::Ready, Self::Called];
    /// Statuses of visits that reached a table.
    pub const COMPLETED: [QueueStatus; 2] = [Self::Seated, Self::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Ready => "ready",
            Self::Called => "called",
            Self::Seated => "seated",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    /// Estimates are only computed before the customer is called.
    pub fn is_estimable(self) -> bool {
        matches!(self, Self::Waiting | Self::Ready)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::NoShow)
    }

    pub fn can_transition_to(self, next: QueueStatus) -> bool {
        use QueueStatus::*;
        matches!(
            (self, next),
            (Waiting, Ready)
                | (Waiting, Called)
                | (Ready, Called)
                | (Ready, Seated)
                | (Called, Seated)
                | (Seated, Done)
                | (Waiting | Ready | Called, Cancelled)
                | (Waiting | Ready | Called, NoShow)
        )
    }

    /// Checks the edge and its guard; seating needs an assigned table.
    pub fn validate_transition(self, next: QueueStatus, has_table: bool) -> Result<(), AppError> {
        if !self.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: self,
                to: next,
            });
        }
        if next == Self::Seated && !has_table {
            return Err(AppError::TableRequired);
        }
        Ok(())
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::QueueStatus::*;
    use super::*;

    const ALL: [QueueStatus; 7] = [Waiting, Ready, Called, Seated, Done, Cancelled, NoShow];

    #[test]
    fn legal_edges_are_exactly_the_documented_ones() {
        let legal = [
            (Waiting, Ready),
            (Waiting, Called),
            (Ready, Called),
            (Ready, Seated),
            (Called, Seated),
            (Seated, Done),
            (Waiting, Cancelled),
            (Ready, Cancelled),
            (Called, Cancelled),
            (Waiting, NoShow),
            (Ready, NoShow),
            (Called, NoShow),
        ];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn terminal_statuses_have_no_outgoing_edges() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(ALL.iter().all(|to| !from.can_transition_to(*to)));
        }
    }

    #[test]
    fn done_cannot_be_seated() {
        let result = Done.validate_transition(Seated, true);
        assert!(matches!(
            result,
            Err(AppError::InvalidTransition {
                from: Done,
                to: Seated
            })
        ));
    }

    #[test]
    fn seating_without_table_is_rejected() {
        assert!(matches!(
            Called.validate_transition(Seated, false),
            Err(AppError::TableRequired)
        ));
        assert!(Called.validate_transition(Seated, true).is_ok());
    }

    #[test]
    fn waiting_cannot_skip_to_seated() {
        assert!(matches!(
            Waiting.validate_transition(Seated, true),
            Err(AppError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn status_serializes_as_snake_case() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&NoShow)?, "\"no_show\"");
        assert_eq!(NoShow.to_string(), "no_show");
        Ok(())
    }
}
