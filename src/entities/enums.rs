//! Enumerazioni - Tipi enumerati utilizzati nelle entità

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Tutor,
}

/// Stato di una sessione di tutoraggio.
///
/// Il ciclo di vita è lineare: la proposta dello studente nasce `Pending`,
/// l'accettazione del tutor la porta in `AwaitingPayment`, la capture del
/// pagamento in `Confirmed`; `Completed` e `Cancelled` sono terminali.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    AwaitingPayment,
    Confirmed,
    Completed,
    Cancelled,
}

impl SessionStatus {
    /// Transizioni legali del ciclo di vita; tutto il resto è un conflitto
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Pending, AwaitingPayment)
                | (Pending, Cancelled)
                | (AwaitingPayment, Confirmed)
                | (AwaitingPayment, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::SessionStatus::*;

    #[test]
    fn legal_transitions_are_exactly_the_lifecycle_edges() {
        let all = [Pending, AwaitingPayment, Confirmed, Completed, Cancelled];
        let legal = [
            (Pending, AwaitingPayment),
            (Pending, Cancelled),
            (AwaitingPayment, Confirmed),
            (AwaitingPayment, Cancelled),
            (Confirmed, Completed),
            (Confirmed, Cancelled),
        ];

        for from in all {
            for to in all {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "transition {:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        let all = [Pending, AwaitingPayment, Confirmed, Completed, Cancelled];
        for from in [Completed, Cancelled] {
            assert!(from.is_terminal());
            for to in all {
                assert!(!from.can_transition_to(to));
            }
        }
    }
}
