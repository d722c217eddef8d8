//! Replication channel interface and an in-memory loopback hub.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::{ActionRecord, SharedDocument};

/// What a peer needs from the document store.
pub trait Replication {
    /// Current shared document, if the match exists.
    fn read(&self) -> Option<SharedDocument>;

    /// Publish a full document. Fire-and-forget.
    fn push(&mut self, doc: &SharedDocument);

    /// Documents published since the last poll, oldest first.
    fn poll(&mut self) -> Vec<SharedDocument>;

    /// Append to the local copy's log and publish it.
    fn append(&mut self, local: &mut SharedDocument, record: ActionRecord) {
        local.actions.push(record);
        self.push(local);
    }
}

#[derive(Debug, Default)]
struct HubState {
    document: Option<SharedDocument>,
    inboxes: Vec<VecDeque<SharedDocument>>,
    pushes: u64,
}

/// Single-threaded stand-in for the document store. Every push is delivered
/// to every endpoint, the pusher included.
#[derive(Debug, Clone, Default)]
pub struct LoopbackHub {
    state: Rc<RefCell<HubState>>,
}

impl LoopbackHub {
    pub fn new(doc: SharedDocument) -> Self {
        let hub = Self::default();
        hub.state.borrow_mut().document = Some(doc);
        hub
    }

    pub fn endpoint(&self) -> HubEndpoint {
        let mut state = self.state.borrow_mut();
        state.inboxes.push(VecDeque::new());
        HubEndpoint {
            state: Rc::clone(&self.state),
            slot: state.inboxes.len() - 1,
        }
    }

    pub fn document(&self) -> Option<SharedDocument> {
        self.state.borrow().document.clone()
    }

    pub fn push_count(&self) -> u64 {
        self.state.borrow().pushes
    }

    /// Notifications waiting across all endpoints.
    pub fn pending(&self) -> usize {
        self.state.borrow().inboxes.iter().map(VecDeque::len).sum()
    }
}

#[derive(Debug)]
pub struct HubEndpoint {
    state: Rc<RefCell<HubState>>,
    slot: usize,
}

impl Replication for HubEndpoint {
    fn read(&self) -> Option<SharedDocument> {
        self.state.borrow().document.clone()
    }

    fn push(&mut self, doc: &SharedDocument) {
        let mut state = self.state.borrow_mut();
        state.document = Some(doc.clone());
        state.pushes += 1;
        for inbox in &mut state.inboxes {
            inbox.push_back(doc.clone());
        }
    }

    fn poll(&mut self) -> Vec<SharedDocument> {
        let mut state = self.state.borrow_mut();
        state
            .inboxes
            .get_mut(self.slot)
            .map(|inbox| inbox.drain(..).collect())
            .unwrap_or_default()
    }
}
