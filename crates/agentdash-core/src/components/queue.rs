use crate::model::QueueTask;

/// Pending work items. Replaced wholesale on every update.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    tasks: Vec<QueueTask>,
}

impl TaskQueue {
    pub fn replace(&mut self, tasks: Vec<QueueTask>) {
        self.tasks = tasks;
    }

    /// (1-based position, task) pairs in queue order.
    pub fn positioned(&self) -> impl Iterator<Item = (usize, &QueueTask)> {
        self.tasks.iter().enumerate().map(|(i, t)| (i + 1, t))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str) -> QueueTask {
        QueueTask { name: name.into() }
    }

    #[test]
    fn replace_is_wholesale_and_positions_are_one_based() {
        let mut queue = TaskQueue::default();
        queue.replace(vec![task("a"), task("b"), task("c")]);
        queue.replace(vec![task("x"), task("y")]);

        let positioned: Vec<(usize, &str)> =
            queue.positioned().map(|(p, t)| (p, t.name.as_str())).collect();
        assert_eq!(positioned, [(1, "x"), (2, "y")]);
    }
}
