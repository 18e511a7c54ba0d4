/// Identifies the request that was current when it was issued.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Monotonic counter for request supersession without cancellation.
///
/// Every issued operation captures a [`Ticket`]; a completion is applied only
/// while its ticket still matches the counter. Advancing the counter turns all
/// in-flight tickets stale.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    current: u64,
}

impl Generation {
    pub fn advance(&mut self) -> Ticket {
        self.current = self.current.wrapping_add(1);
        Ticket(self.current)
    }

    pub fn ticket(&self) -> Ticket {
        Ticket(self.current)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::Generation;

    #[test]
    fn advancing_invalidates_earlier_tickets() {
        let mut generation = Generation::default();
        let first = generation.advance();
        assert!(generation.is_current(first));

        let second = generation.advance();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn reading_the_ticket_does_not_advance() {
        let mut generation = Generation::default();
        let issued = generation.advance();
        assert_eq!(generation.ticket(), issued);
        assert!(generation.is_current(generation.ticket()));
    }
}
