//! Controller registry
//!
//! Tracks every connected controller by its stable identifier, together with
//! the ordered set of controllers still alive in the current game. Purely
//! in-memory; feedback is decided by the session, not here.

use crate::controller::{ControllerId, Feedback, Rgb, Transport};
use log::{debug, info};
use std::collections::{HashMap, HashSet};

/// Immutable identity of a connected controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerDescriptor {
    pub id: ControllerId,
    pub transport: Transport,
}

/// Per-game mutable state of a controller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerState {
    /// Last motion magnitude seen during the Active phase
    pub last_motion: Option<f64>,

    /// Player color, fixed for the whole game
    pub assigned_color: Option<Rgb>,

    /// Feedback pushed to the device every tick
    pub feedback: Feedback,

    /// CIRCLE is held and the battery tier is being shown
    pub battery_display: bool,
}

/// A connected controller
#[derive(Debug, Clone)]
pub struct ControllerRecord {
    pub descriptor: ControllerDescriptor,
    pub state: ControllerState,
}

impl ControllerRecord {
    pub fn is_wireless(&self) -> bool {
        self.descriptor.transport == Transport::Wireless
    }
}

/// Registry of connected controllers and the alive set
#[derive(Debug, Default)]
pub struct ControllerRegistry {
    records: HashMap<ControllerId, ControllerRecord>,
    /// Controllers still in contention, in join order
    alive: Vec<ControllerId>,
    /// Every (id, transport) pair seen during this process lifetime
    seen: HashSet<(ControllerId, Transport)>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or revive a controller.
    ///
    /// Returns `true` the first time this id is seen over this transport.
    pub fn connect(&mut self, id: ControllerId, transport: Transport) -> bool {
        let first_contact = self.seen.insert((id.clone(), transport));

        match self.records.get_mut(&id) {
            Some(record) if record.descriptor.transport == transport => {
                debug!("Controller {} already registered", id);
            }
            Some(record) => {
                // Same device, new link: it can't keep playing over a cable
                info!("Controller {} switched to {:?}", id, transport);
                record.descriptor.transport = transport;
                record.state = ControllerState::default();
                self.alive.retain(|alive| alive != &id);
            }
            None => {
                let record = ControllerRecord {
                    descriptor: ControllerDescriptor {
                        id: id.clone(),
                        transport,
                    },
                    state: ControllerState {
                        feedback: Feedback::new(Rgb::WHITE, 0),
                        ..ControllerState::default()
                    },
                };
                self.records.insert(id, record);
            }
        }

        first_contact
    }

    /// Remove a controller and everything known about it.
    ///
    /// Unknown ids are ignored.
    pub fn disconnect(&mut self, id: &ControllerId) -> Option<ControllerRecord> {
        self.alive.retain(|alive| alive != id);
        self.records.remove(id)
    }

    /// Add a registered wireless controller to the alive set
    pub fn admit(&mut self, id: &ControllerId) -> bool {
        let eligible = self.records.get(id).map_or(false, |r| r.is_wireless());
        if !eligible || self.alive.contains(id) {
            return false;
        }

        self.alive.push(id.clone());
        true
    }

    /// Drop a controller from the alive set and forget its motion history
    pub fn eliminate(&mut self, id: &ControllerId) {
        self.alive.retain(|alive| alive != id);
        if let Some(record) = self.records.get_mut(id) {
            record.state.last_motion = None;
        }
    }

    /// Give each alive controller its color, in alive-set order
    pub fn assign_colors(&mut self, colors: &[Rgb]) {
        for (id, color) in self.alive.iter().zip(colors) {
            if let Some(record) = self.records.get_mut(id) {
                record.state.assigned_color = Some(*color);
            }
        }
    }

    /// Clear every per-game field
    pub fn reset_game(&mut self) {
        self.alive.clear();
        for record in self.records.values_mut() {
            record.state.last_motion = None;
            record.state.assigned_color = None;
            record.state.battery_display = false;
            record.state.feedback.rumble = 0;
        }
    }

    pub fn get(&self, id: &ControllerId) -> Option<&ControllerRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &ControllerId) -> Option<&mut ControllerRecord> {
        self.records.get_mut(id)
    }

    pub fn contains(&self, id: &ControllerId) -> bool {
        self.records.contains_key(id)
    }

    pub fn is_alive(&self, id: &ControllerId) -> bool {
        self.alive.contains(id)
    }

    /// Alive controllers in join order
    pub fn alive(&self) -> &[ControllerId] {
        &self.alive
    }

    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    /// Number of connected controllers that can play
    pub fn wireless_count(&self) -> usize {
        self.records.values().filter(|r| r.is_wireless()).count()
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<ControllerId> {
        let mut ids: Vec<_> = self.records.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
