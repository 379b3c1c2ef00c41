use crate::models::Event;

/// Every event loaded at startup, in store order, plus a chronological index
/// computed once for the sequential analyses.
#[derive(Clone, Debug, Default)]
pub struct BaseDataset {
    events: Vec<Event>,
    chronological: Vec<usize>,
}

impl BaseDataset {
    pub fn new(events: Vec<Event>) -> Self {
        let mut chronological: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, event)| event.time.is_some())
            .map(|(index, _)| index)
            .collect();
        // stable: simultaneous events keep store order
        chronological.sort_by_key(|index| events[*index].time);

        Self {
            events,
            chronological,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timed events ordered by `time` ascending.
    pub fn chronological(&self) -> impl Iterator<Item = &Event> + '_ {
        self.chronological.iter().map(|index| &self.events[*index])
    }
}
