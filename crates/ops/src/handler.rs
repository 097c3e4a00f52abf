use calcell_core::Result;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use tracing::{debug, error, info};

use crate::Command;

/// Single execution choke point. Runs commands and keeps a bounded,
/// oldest-first-evicted log of the ones that succeeded.
pub struct CommandHandler {
    history: VecDeque<Box<dyn Command>>,
    max_history_size: usize,
}

impl CommandHandler {
    pub fn new(max_history_size: usize) -> Self {
        debug!(max_history_size, "CommandHandler initialized");
        Self {
            history: VecDeque::with_capacity(max_history_size.min(64)),
            max_history_size,
        }
    }

    /// Run `command`. Only successful commands enter the history; errors are
    /// returned unchanged and leave the history untouched.
    pub fn execute(&mut self, command: Box<dyn Command>) -> Result<Decimal> {
        info!(command = %command, "Executing command");
        match command.execute() {
            Ok(result) => {
                debug!(command = %command, result = %result, "Command executed successfully");
                self.push(command);
                Ok(result)
            }
            Err(e) => {
                error!(command = %command, error = %e, "Error executing command");
                Err(e)
            }
        }
    }

    fn push(&mut self, command: Box<dyn Command>) {
        self.history.push_back(command);
        while self.history.len() > self.max_history_size {
            if let Some(evicted) = self.history.pop_front() {
                debug!(
                    max_history_size = self.max_history_size,
                    evicted = %evicted,
                    "History size exceeded limit, removed oldest command"
                );
            }
        }
    }

    /// Executed commands, oldest first.
    pub fn history(&self) -> &VecDeque<Box<dyn Command>> {
        &self.history
    }

    pub fn get(&self, index: usize) -> Option<&dyn Command> {
        self.history.get(index).map(|c| c.as_ref())
    }

    pub fn latest(&self) -> Option<&dyn Command> {
        self.history.back().map(|c| c.as_ref())
    }

    pub fn find_by_name(&self, name: &str) -> Vec<&dyn Command> {
        let found: Vec<&dyn Command> = self
            .history
            .iter()
            .filter(|c| c.name() == name)
            .map(|c| c.as_ref())
            .collect();
        debug!(name, count = found.len(), "Found commands by name");
        found
    }

    pub fn clear_history(&mut self) {
        let removed = self.history.len();
        self.history.clear();
        info!(removed, "Command history cleared");
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn max_history_size(&self) -> usize {
        self.max_history_size
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new(calcell_core::HistoryConfig::default().max_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{AddCommand, DivideCommand, MultiplyCommand};
    use calcell_core::Error;
    use rust_decimal_macros::dec;

    fn add(a: i64, b: i64) -> Box<dyn Command> {
        Box::new(AddCommand::new(Decimal::from(a), Decimal::from(b)))
    }

    #[test]
    fn test_handler_starts_empty() {
        let handler = CommandHandler::default();
        assert!(handler.is_empty());
        assert_eq!(handler.max_history_size(), 5);
        assert!(handler.latest().is_none());
    }

    #[test]
    fn test_execute_records_success() {
        let mut handler = CommandHandler::new(5);
        let result = handler.execute(add(5, 3)).unwrap();
        assert_eq!(result, dec!(8));
        assert_eq!(handler.len(), 1);
        assert_eq!(handler.latest().unwrap().to_string(), "AddCommand(5, 3)");
    }

    #[test]
    fn test_failed_execution_leaves_no_trace() {
        let mut handler = CommandHandler::new(5);
        handler.execute(add(1, 1)).unwrap();

        let err = handler
            .execute(Box::new(DivideCommand::new(dec!(10), dec!(0))))
            .unwrap_err();
        assert!(matches!(err, Error::DivisionByZero));
        assert_eq!(handler.len(), 1);
        assert_eq!(handler.latest().unwrap().name(), "add");
    }

    #[test]
    fn test_fifo_eviction() {
        let mut handler = CommandHandler::new(3);
        for a in 1..=5 {
            handler.execute(add(a, 0)).unwrap();
        }
        assert_eq!(handler.len(), 3);
        let a_values: Vec<Decimal> = handler.history().iter().map(|c| c.operands().0).collect();
        assert_eq!(a_values, vec![dec!(3), dec!(4), dec!(5)]);
    }

    #[test]
    fn test_history_never_exceeds_max() {
        for max in [1usize, 2, 5, 8] {
            let mut handler = CommandHandler::new(max);
            let n = max as i64 * 3 + 1;
            for a in 1..=n {
                handler.execute(add(a, 1)).unwrap();
                assert!(handler.len() <= max);
            }
            assert_eq!(handler.len(), max);
            // Oldest survivor is execution number n - max + 1.
            assert_eq!(handler.get(0).unwrap().operands().0, Decimal::from(n - max as i64 + 1));
        }
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut handler = CommandHandler::new(0);
        assert_eq!(handler.execute(add(2, 2)).unwrap(), dec!(4));
        assert!(handler.is_empty());
    }

    #[test]
    fn test_find_by_name_and_positional_access() {
        let mut handler = CommandHandler::new(10);
        handler.execute(add(1, 2)).unwrap();
        handler
            .execute(Box::new(MultiplyCommand::new(dec!(2), dec!(3))))
            .unwrap();
        handler.execute(add(4, 5)).unwrap();

        let adds = handler.find_by_name("add");
        assert_eq!(adds.len(), 2);
        assert_eq!(adds[0].operands(), (dec!(1), dec!(2)));
        assert_eq!(adds[1].operands(), (dec!(4), dec!(5)));
        assert!(handler.find_by_name("divide").is_empty());

        assert_eq!(handler.get(1).unwrap().name(), "multiply");
        assert!(handler.get(3).is_none());
    }

    #[test]
    fn test_clear_history() {
        let mut handler = CommandHandler::new(5);
        handler.execute(add(1, 2)).unwrap();
        handler.execute(add(3, 4)).unwrap();
        handler.clear_history();
        assert!(handler.is_empty());
        assert!(handler.latest().is_none());
    }
}
