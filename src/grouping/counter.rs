//! Per-group task capacity table.

use crate::config::EventConfiguration;
use crate::label::Task;

/// Capacity of one task in one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSlot {
    pub max: u32,
    pub count: u32,
}

impl TaskSlot {
    fn new(max: u32) -> Self {
        Self { max, count: 0 }
    }

    pub fn has_room(&self) -> bool {
        self.count < self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GroupTasks {
    judge: TaskSlot,
    scrambler: TaskSlot,
    runner: TaskSlot,
}

/// Judge, scrambler and runner capacity for every parallel group slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCounter {
    groups: Vec<GroupTasks>,
}

impl TaskCounter {
    /// One entry per group slot (`stages × scrambleGroups`), caps from the
    /// event configuration.
    pub fn new(configuration: &EventConfiguration) -> Self {
        let template = GroupTasks {
            judge: TaskSlot::new(configuration.timers),
            scrambler: TaskSlot::new(configuration.scramblers),
            runner: TaskSlot::new(configuration.runners),
        };
        Self {
            groups: vec![template; configuration.number_of_groups() as usize],
        }
    }

    /// Capacity of a task in a group (0-based index). Untracked tasks and
    /// out-of-range groups have no capacity.
    pub fn slot(&self, group: usize, task: Task) -> TaskSlot {
        let Some(tasks) = self.groups.get(group) else {
            return TaskSlot::new(0);
        };
        match task {
            Task::Judge => tasks.judge,
            Task::Scrambler => tasks.scrambler,
            Task::Runner => tasks.runner,
            Task::DataEntry | Task::Announcer => TaskSlot::new(0),
        }
    }

    pub fn has_room(&self, group: usize, task: Task) -> bool {
        self.slot(group, task).has_room()
    }

    /// Takes one unit of capacity. Returns `false` if the slot was full.
    pub fn take(&mut self, group: usize, task: Task) -> bool {
        let Some(tasks) = self.groups.get_mut(group) else {
            return false;
        };
        let slot = match task {
            Task::Judge => &mut tasks.judge,
            Task::Scrambler => &mut tasks.scrambler,
            Task::Runner => &mut tasks.runner,
            Task::DataEntry | Task::Announcer => return false,
        };
        if !slot.has_room() {
            return false;
        }
        slot.count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_counter_table() {
        let config = EventConfiguration::new(3, 2).with_staff(2, 1, 8);
        let counter = TaskCounter::new(&config);
        for group in 0..6 {
            assert_eq!(counter.slot(group, Task::Scrambler), TaskSlot { max: 2, count: 0 });
            assert_eq!(counter.slot(group, Task::Runner).max, 1);
            assert_eq!(counter.slot(group, Task::Judge).max, 8);
        }
        assert!(!counter.has_room(6, Task::Judge));
    }

    #[test]
    fn test_take_until_full() {
        let config = EventConfiguration::new(2, 1).with_staff(2, 0, 0);
        let mut counter = TaskCounter::new(&config);
        assert!(counter.take(1, Task::Scrambler));
        assert!(counter.take(1, Task::Scrambler));
        assert!(!counter.take(1, Task::Scrambler));
        assert_eq!(counter.slot(1, Task::Scrambler).count, 2);
        assert_eq!(counter.slot(0, Task::Scrambler).count, 0);
        assert!(!counter.take(0, Task::Runner));
        assert!(!counter.take(0, Task::DataEntry));
    }
}
