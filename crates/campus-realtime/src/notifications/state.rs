use campus_common::Notification;

/// Notifications held by the client, newest first, plus the unread counter.
#[derive(Debug, Clone, Default)]
pub struct NotificationState {
    items: Vec<Notification>,
    unread: usize,
}

impl NotificationState {
    pub fn from_list(items: Vec<Notification>) -> Self {
        let mut state = Self::default();
        state.replace(items);
        state
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread_count(&self) -> usize {
        self.unread
    }

    /// Prepend a pushed notification.
    pub fn push(&mut self, notification: Notification) {
        if !notification.is_read {
            self.unread += 1;
        }
        self.items.insert(0, notification);
    }

    /// Mark one notification read. Returns `false` if it was already read or
    /// is not held, in which case nothing changes.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.is_read => {
                n.is_read = true;
                self.unread = self.unread.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    /// Mark everything read. Returns how many items changed.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for n in self.items.iter_mut().filter(|n| !n.is_read) {
            n.is_read = true;
            changed += 1;
        }
        self.unread = 0;
        changed
    }

    /// Replace the list, e.g. with the result of the REST poll.
    pub fn replace(&mut self, items: Vec<Notification>) {
        self.unread = items.iter().filter(|n| !n.is_read).count();
        self.items = items;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_common::NotificationKind;
    use chrono::Utc;

    fn notification(id: &str, is_read: bool) -> Notification {
        Notification {
            id: id.into(),
            kind: NotificationKind::Like,
            content: "Grace liked your post".into(),
            is_read,
            created_at: Utc::now(),
            user_id: "u1".into(),
            related_id: Some("p1".into()),
        }
    }

    #[test]
    fn push_prepends_and_counts_unread() {
        let mut state = NotificationState::from_list(vec![notification("n1", true)]);
        state.push(notification("n2", false));
        state.push(notification("n3", true));

        assert_eq!(state.items()[0].id, "n3");
        assert_eq!(state.items().len(), 3);
        assert_eq!(state.unread_count(), 1);
    }

    #[test]
    fn mark_read_twice_decrements_once() {
        let mut state = NotificationState::from_list(vec![notification("n1", false)]);
        assert!(state.mark_read("n1"));
        assert!(!state.mark_read("n1"));
        assert!(state.items()[0].is_read);
        assert_eq!(state.unread_count(), 0);
    }

    #[test]
    fn mark_read_unknown_id_is_noop() {
        let mut state = NotificationState::from_list(vec![notification("n1", false)]);
        assert!(!state.mark_read("n9"));
        assert_eq!(state.unread_count(), 1);
    }

    #[test]
    fn mark_all_read_resets_counter() {
        let mut state = NotificationState::from_list(vec![
            notification("n1", false),
            notification("n2", true),
            notification("n3", false),
        ]);
        assert_eq!(state.unread_count(), 2);
        assert_eq!(state.mark_all_read(), 2);
        assert_eq!(state.unread_count(), 0);
        assert!(state.items().iter().all(|n| n.is_read));
    }
}
