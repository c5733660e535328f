//! Fixed-size message table.

use crate::error::{PopError, Result};

use super::message::Message;

/// All messages of the mailbox, indexed by server message number.
///
/// The table is sized once from the `STAT` count and never grows or
/// shrinks afterwards. Deleting a message only sets its flag; the entry
/// stays in place so numbers keep matching the server.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    /// Create `count` empty entries numbered `1..=count`.
    pub fn new(count: usize) -> Result<Self> {
        let mut messages = Vec::new();
        messages
            .try_reserve_exact(count)
            .map_err(|_| PopError::Allocation(count))?;
        for i in 0..count {
            let number = u32::try_from(i + 1).map_err(|_| PopError::Allocation(count))?;
            messages.push(Message::new(number));
        }
        Ok(Self { messages })
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the mailbox is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Look up a message by its 1-based number.
    pub fn get(&self, number: u32) -> Option<&Message> {
        let idx = (number as usize).checked_sub(1)?;
        self.messages.get(idx)
    }

    /// Mutable lookup by 1-based number.
    pub fn get_mut(&mut self, number: u32) -> Option<&mut Message> {
        let idx = (number as usize).checked_sub(1)?;
        self.messages.get_mut(idx)
    }

    /// Look up a message by its 0-based position (as used by the viewport).
    pub fn at(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Mutable lookup by 0-based position.
    pub fn at_mut(&mut self, index: usize) -> Option<&mut Message> {
        self.messages.get_mut(index)
    }

    /// Iterate in message-number order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Flip the deletion flag of message `number`. Returns the new state.
    pub fn toggle(&mut self, number: u32) -> Option<bool> {
        let msg = self.get_mut(number)?;
        msg.marked_for_deletion = !msg.marked_for_deletion;
        Some(msg.marked_for_deletion)
    }

    /// Numbers of all messages marked for deletion, ascending.
    pub fn marked_numbers(&self) -> Vec<u32> {
        self.messages
            .iter()
            .filter(|m| m.marked_for_deletion)
            .map(|m| m.number)
            .collect()
    }

    /// How many messages are marked for deletion.
    pub fn marked_count(&self) -> usize {
        self.messages.iter().filter(|m| m.marked_for_deletion).count()
    }

    /// Combined size of the marked messages.
    pub fn marked_size(&self) -> u64 {
        self.messages
            .iter()
            .filter(|m| m.marked_for_deletion)
            .map(|m| m.size)
            .sum()
    }

    /// Combined size of all messages.
    pub fn total_size(&self) -> u64 {
        self.messages.iter().map(|m| m.size).sum()
    }
}

impl<'a> IntoIterator for &'a MessageStore {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_are_dense() {
        let store = MessageStore::new(4).unwrap();
        let numbers: Vec<u32> = store.iter().map(|m| m.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert!(store.iter().all(|m| m.size == 0 && !m.marked_for_deletion));
    }

    #[test]
    fn test_lookup_by_number_and_position() {
        let store = MessageStore::new(3).unwrap();
        assert!(store.get(0).is_none());
        assert_eq!(store.get(1).map(|m| m.number), Some(1));
        assert_eq!(store.get(3).map(|m| m.number), Some(3));
        assert!(store.get(4).is_none());
        assert_eq!(store.at(0).map(|m| m.number), Some(1));
        assert!(store.at(3).is_none());
    }

    #[test]
    fn test_toggle_and_marked_numbers() {
        let mut store = MessageStore::new(3).unwrap();
        store.get_mut(1).unwrap().size = 100;
        store.get_mut(3).unwrap().size = 50;
        assert_eq!(store.toggle(3), Some(true));
        assert_eq!(store.toggle(1), Some(true));
        assert_eq!(store.toggle(9), None);
        assert_eq!(store.marked_numbers(), vec![1, 3]);
        assert_eq!(store.marked_count(), 2);
        assert_eq!(store.marked_size(), 150);
        assert_eq!(store.toggle(1), Some(false));
        assert_eq!(store.marked_numbers(), vec![3]);
    }

    #[test]
    fn test_empty_store() {
        let store = MessageStore::new(0).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.total_size(), 0);
    }
}
