//! Gemeinsame Test-Helfer: Mock-Transfers und Rotor-Simulation

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pov_core::config::COLUMN_BUFFER_SIZE;
use pov_core::{
    ColumnBuffer, ColumnPipeline, FrameStore, FrameWriter, OutputTransfer, RotationTracker,
    StripLane,
};

// ============================================================================
// Mock Output Transfer
// ============================================================================

/// Spalten-Buffer mit Kennung, damit Tests das Ping-Pong verfolgen können
pub struct MockBuffer {
    pub id: usize,
    pub words: [u32; COLUMN_BUFFER_SIZE],
}

impl MockBuffer {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            words: [0; COLUMN_BUFFER_SIZE],
        }
    }
}

impl ColumnBuffer for MockBuffer {
    fn put(&mut self, index: usize, word: u32) {
        self.words[index] = word;
    }
}

/// Protokoll eines Mock-Transfers
#[derive(Default)]
pub struct TransferLog {
    /// (Buffer-ID, Inhalt) je gestartetem Transfer
    pub started: Vec<(usize, [u32; COLUMN_BUFFER_SIZE])>,
    /// start() aufgerufen während is_busy() wahr war
    pub overlaps: usize,
    /// wait_idle() musste tatsächlich warten
    pub waits: usize,
}

impl TransferLog {
    pub fn last_words(&self) -> [u32; COLUMN_BUFFER_SIZE] {
        self.started.last().expect("no transfer started").1
    }
}

/// Transfer mit simulierter Dauer auf einer gemeinsamen Uhr
pub struct MockTransfer {
    clock: Rc<Cell<u64>>,
    duration_us: u64,
    in_flight: Option<(MockBuffer, u64)>,
    log: Rc<RefCell<TransferLog>>,
}

impl MockTransfer {
    pub fn new(clock: Rc<Cell<u64>>, duration_us: u64) -> (Self, Rc<RefCell<TransferLog>>) {
        let log = Rc::new(RefCell::new(TransferLog::default()));
        let transfer = Self {
            clock,
            duration_us,
            in_flight: None,
            log: Rc::clone(&log),
        };
        (transfer, log)
    }
}

impl OutputTransfer for MockTransfer {
    type Buffer = MockBuffer;

    fn start(&mut self, buffer: MockBuffer) {
        let mut log = self.log.borrow_mut();
        if self.is_busy() || self.in_flight.is_some() {
            log.overlaps += 1;
        }
        log.started.push((buffer.id, buffer.words));
        self.in_flight = Some((buffer, self.clock.get() + self.duration_us));
    }

    fn is_busy(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|(_, done_at)| self.clock.get() < *done_at)
    }

    fn wait_idle(&mut self) -> Option<MockBuffer> {
        let (buffer, done_at) = self.in_flight.take()?;
        if self.clock.get() < done_at {
            // Busy-Wait simulieren: Uhr bis zum Ende des Transfers vorspulen
            self.log.borrow_mut().waits += 1;
            self.clock.set(done_at);
        }
        Some(buffer)
    }
}

// ============================================================================
// Test-Rig
// ============================================================================

/// Pipeline + Tracker + Frame Store mit simulierter Uhr
pub struct Rig {
    pub clock: Rc<Cell<u64>>,
    pub tracker: &'static RotationTracker,
    pub store: &'static FrameStore,
    pub writer: FrameWriter<'static>,
    pub pipeline: ColumnPipeline<'static, MockTransfer>,
    pub logs: [Rc<RefCell<TransferLog>>; 2],
}

impl Rig {
    pub fn new(transfer_us: u64) -> Self {
        let clock = Rc::new(Cell::new(0));
        let tracker: &'static RotationTracker = Box::leak(Box::new(RotationTracker::new()));
        let store: &'static FrameStore = Box::leak(Box::new(FrameStore::new()));
        let (writer, reader) = store.split().unwrap();

        let (transfer_a, log_a) = MockTransfer::new(Rc::clone(&clock), transfer_us);
        let (transfer_b, log_b) = MockTransfer::new(Rc::clone(&clock), transfer_us);
        let lanes = [
            StripLane::new(transfer_a, MockBuffer::new(0), MockBuffer::new(1)),
            StripLane::new(transfer_b, MockBuffer::new(2), MockBuffer::new(3)),
        ];

        Self {
            clock,
            tracker,
            store,
            writer,
            pipeline: ColumnPipeline::new(tracker, reader, lanes),
            logs: [log_a, log_b],
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.get()
    }

    pub fn set_now(&self, now: u64) {
        self.clock.set(now);
    }

    /// Simuliert `count` Hall-Flanken im Abstand `period_us` ab jetzt
    /// und lässt die Uhr auf der letzten Flanke stehen
    pub fn spin(&self, period_us: u64, count: usize) {
        for i in 0..count {
            if i > 0 {
                self.clock.set(self.clock.get() + period_us);
            }
            self.tracker.on_edge(self.clock.get());
        }
    }

    pub fn tick(&mut self) -> Option<usize> {
        let now = self.clock.get();
        self.pipeline.tick(now)
    }

    pub fn started(&self, strip: usize) -> usize {
        self.logs[strip].borrow().started.len()
    }
}
