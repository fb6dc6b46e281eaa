//! Event handling.
//!
//! This library exposes an event-based interface for reacting
//! to the state changes of the CPU in real-time. [EventListeners](EventListener)
//! can be registered on the [Cpu](crate::cpu::Cpu) with the
//! [add_listener](crate::cpu::Cpu::add_listener) method.
//!
//! Events are dispatched only after an instruction has been executed successfully.
//!
//! A blanket implementation of [EventListener] for all `Fn(&Event)` is provided.

use std::fmt;

use crate::instruction::Register;
use crate::memory::Access;

/// Represents an event that occurred while executing a program.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// An instruction was executed.
    Step {
        /// Source line of the executed instruction.
        line: usize,

        /// Value of the program counter after the instruction.
        pc: u64,
    },

    /// The program modified a register.
    RegisterChange {
        /// The register which was modified.
        register: Register,

        /// The new value of the register.
        value: i64,
    },

    /// The program read or wrote a memory location.
    MemoryChange {
        /// The address of the accessed memory location.
        address: u64,

        access: Access,

        /// The value that was read or written.
        value: i64,
    },

    /// The program counter left the program and the CPU stopped.
    Halted {
        pc: u64,
    },
}

/// Trait for consuming events.
pub trait EventListener {
    /// Called whenever a new event has been created.
    fn event(&mut self, event: &Event);
}

impl<F> EventListener for F where F: Fn(&Event) {
    fn event(&mut self, event: &Event) {
        self(event)
    }
}

pub(crate) struct EventDispatcher {
    listeners: Vec<Box<dyn EventListener>>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EventDispatcher {{ listeners: {} }}", self.listeners.len())
    }
}

impl EventDispatcher {
    pub fn new() -> EventDispatcher {
        EventDispatcher {
            listeners: Vec::new(),
        }
    }

    pub fn add_listener<L: EventListener + 'static>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener) as Box<dyn EventListener>)
    }

    pub fn dispatch(&mut self, event: Event) {
        for listener in &mut self.listeners {
            listener.event(&event);
        }
    }
}
