//! Order lifecycle states and the transitions between them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    #[serde(alias = "completed")]
    Fulfilled,
    Cancelled,
}

/// Who is asking for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    Customer,
    StallStaff,
}

struct Transition {
    from: OrderStatus,
    to: OrderStatus,
    actors: &'static [Actor],
}

const TRANSITIONS: [Transition; 6] = [
    Transition {
        from: OrderStatus::Pending,
        to: OrderStatus::Confirmed,
        actors: &[Actor::StallStaff],
    },
    Transition {
        from: OrderStatus::Pending,
        to: OrderStatus::Cancelled,
        actors: &[Actor::Customer, Actor::StallStaff],
    },
    Transition {
        from: OrderStatus::Confirmed,
        to: OrderStatus::Preparing,
        actors: &[Actor::StallStaff],
    },
    Transition {
        from: OrderStatus::Confirmed,
        to: OrderStatus::Cancelled,
        actors: &[Actor::StallStaff],
    },
    Transition {
        from: OrderStatus::Preparing,
        to: OrderStatus::Ready,
        actors: &[Actor::StallStaff],
    },
    Transition {
        from: OrderStatus::Ready,
        to: OrderStatus::Fulfilled,
        actors: &[Actor::StallStaff],
    },
];

impl OrderStatus {
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Preparing,
        Self::Ready,
        Self::Fulfilled,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Fulfilled => "fulfilled",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Cancelled)
    }

    /// Whether the promised time may still be moved.
    #[must_use]
    pub const fn is_reschedulable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Whether `actor` may move an order from `self` to `to`.
    #[must_use]
    pub fn can_transition(self, to: Self, actor: Actor) -> bool {
        TRANSITIONS
            .iter()
            .any(|rule| rule.from == self && rule.to == to && rule.actors.contains(&actor))
    }

    /// Every status `actor` may move an order to from `self`.
    #[must_use]
    pub fn allowed_transitions(self, actor: Actor) -> SmallVec<[Self; 2]> {
        TRANSITIONS
            .iter()
            .filter(|rule| rule.from == self && rule.actors.contains(&actor))
            .map(|rule| rule.to)
            .collect()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "fulfilled" | "completed" => Ok(Self::Fulfilled),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(UnknownStatus(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: [(OrderStatus, OrderStatus, bool, bool); 6] = [
        // (from, to, customer, staff)
        (OrderStatus::Pending, OrderStatus::Confirmed, false, true),
        (OrderStatus::Pending, OrderStatus::Cancelled, true, true),
        (OrderStatus::Confirmed, OrderStatus::Preparing, false, true),
        (OrderStatus::Confirmed, OrderStatus::Cancelled, false, true),
        (OrderStatus::Preparing, OrderStatus::Ready, false, true),
        (OrderStatus::Ready, OrderStatus::Fulfilled, false, true),
    ];

    #[test]
    fn every_pair_follows_the_table() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let row = TABLE.iter().find(|(f, t, _, _)| *f == from && *t == to);
                let (customer, staff) = row.map_or((false, false), |(_, _, c, s)| (*c, *s));

                assert_eq!(
                    from.can_transition(to, Actor::Customer),
                    customer,
                    "customer {from} -> {to}"
                );
                assert_eq!(
                    from.can_transition(to, Actor::StallStaff),
                    staff,
                    "staff {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn terminal_states_allow_nothing() {
        for status in [OrderStatus::Fulfilled, OrderStatus::Cancelled] {
            assert!(status.is_terminal());
            assert!(status.allowed_transitions(Actor::StallStaff).is_empty());
            assert!(status.allowed_transitions(Actor::Customer).is_empty());
        }
    }

    #[test]
    fn allowed_transitions_depend_on_actor() {
        assert_eq!(
            OrderStatus::Pending
                .allowed_transitions(Actor::StallStaff)
                .as_slice(),
            &[OrderStatus::Confirmed, OrderStatus::Cancelled]
        );
        assert_eq!(
            OrderStatus::Pending
                .allowed_transitions(Actor::Customer)
                .as_slice(),
            &[OrderStatus::Cancelled]
        );
        assert!(
            OrderStatus::Confirmed
                .allowed_transitions(Actor::Customer)
                .is_empty()
        );
    }

    #[test]
    fn completed_is_an_alias_of_fulfilled() -> Result<(), serde_json::Error> {
        assert_eq!("completed".parse::<OrderStatus>().ok(), Some(OrderStatus::Fulfilled));
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"completed\"")?,
            OrderStatus::Fulfilled
        );
        assert_eq!(serde_json::to_string(&OrderStatus::Fulfilled)?, "\"fulfilled\"");

        Ok(())
    }

    #[test]
    fn only_pending_and_confirmed_are_reschedulable() {
        let reschedulable: Vec<_> = OrderStatus::ALL
            .into_iter()
            .filter(|status| status.is_reschedulable())
            .collect();

        assert_eq!(reschedulable, vec![OrderStatus::Pending, OrderStatus::Confirmed]);
    }
}
