//! Callback registry the engine notifies as events happen.
//!
//! Presentation layers subscribe here instead of the engine knowing about
//! them.

use crate::events::{EngineSnapshot, Event, FiredAlarm, TickUpdate};

type Callback<T> = Box<dyn FnMut(&T) + Send>;

#[derive(Default)]
pub(crate) struct Observers {
    tick: Vec<Callback<TickUpdate>>,
    alarm: Vec<Callback<FiredAlarm>>,
    state: Vec<Callback<EngineSnapshot>>,
    any: Vec<Callback<Event>>,
}

impl Observers {
    pub(crate) fn on_tick(&mut self, f: impl FnMut(&TickUpdate) + Send + 'static) {
        self.tick.push(Box::new(f));
    }

    pub(crate) fn on_alarm_fired(&mut self, f: impl FnMut(&FiredAlarm) + Send + 'static) {
        self.alarm.push(Box::new(f));
    }

    pub(crate) fn on_state_changed(&mut self, f: impl FnMut(&EngineSnapshot) + Send + 'static) {
        self.state.push(Box::new(f));
    }

    pub(crate) fn on_event(&mut self, f: impl FnMut(&Event) + Send + 'static) {
        self.any.push(Box::new(f));
    }

    pub(crate) fn dispatch(&mut self, event: &Event) {
        match event {
            Event::Tick(update) => self.tick.iter_mut().for_each(|f| f(update)),
            Event::AlarmFired(alarm) => self.alarm.iter_mut().for_each(|f| f(alarm)),
            Event::StateChanged(snapshot) => self.state.iter_mut().for_each(|f| f(snapshot)),
            _ => {}
        }
        self.any.iter_mut().for_each(|f| f(event));
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("tick", &self.tick.len())
            .field("alarm", &self.alarm.len())
            .field("state", &self.state.len())
            .field("any", &self.any.len())
            .finish()
    }
}
