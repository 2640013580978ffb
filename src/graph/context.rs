use log::debug;

use crate::graph::{
    filter::FilterNode,
    gain::GainNode,
    node::{
        AudioNodeHandle, DestinationHandle, FilterHandle, GainHandle, GraphError, GraphNode,
        NodeId, OscillatorHandle, RenderCtx,
    },
    oscillator::OscillatorNode,
};
use crate::MAX_BLOCK_SIZE;

/*
Audio Context
=============

Owns every node of one audio graph, the connections between them, and the
clock they all share.

  ┌─────┐   ┌────────┐   ┌──────┐   ┌─────────────┐
  │ osc │──→│ filter │──→│ gain │──→│ destination │──→ render_block(out)
  └─────┘   └────────┘   └──────┘   └─────────────┘

Rendering is pull-based and block-at-a-time. For each block:

  1. Walk upstream from the destination and list nodes in dependency order
     (every node after all of its inputs).
  2. For each node, sum its inputs' outputs into its own buffer and run
     `process` on it in place.
  3. Copy the destination's buffer to the caller and advance the clock.
  4. Release oscillators whose stop time has passed, then any gain/filter
     node that losing them left with no inputs at all.

The clock is a frame counter, so `current_time()` is exact and monotonic:
frames / sample_rate. Nothing outside `render_block` moves it.

Nodes live in slots addressed by `NodeId`. Releasing a node bumps its slot's
generation, so handles to released nodes fail with `UnknownNode` instead of
silently reaching whatever reused the slot.

Released nodes are not dropped. They wait in a spare pool with their buffers
intact, and the next `create_*` of the same kind resets one and hands it out
again. Once the pool has seen as many nodes as the busiest moment needed,
starting and ending notes costs no allocation.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Running,
    Closed,
}

enum NodeKind {
    Oscillator(OscillatorNode),
    Gain(GainNode),
    Filter(FilterNode),
    Destination,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum NodeType {
    Oscillator,
    Gain,
    Filter,
    Destination,
}

impl NodeKind {
    fn is_source(&self) -> bool {
        matches!(self, NodeKind::Oscillator(_))
    }

    fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Oscillator(_) => NodeType::Oscillator,
            NodeKind::Gain(_) => NodeType::Gain,
            NodeKind::Filter(_) => NodeType::Filter,
            NodeKind::Destination => NodeType::Destination,
        }
    }

    fn reset(&mut self) {
        match self {
            NodeKind::Oscillator(node) => node.reset(),
            NodeKind::Gain(node) => node.reset(),
            NodeKind::Filter(node) => node.reset(),
            NodeKind::Destination => {}
        }
    }
}

struct NodeEntry {
    kind: NodeKind,
    inputs: Vec<NodeId>,
    output: Vec<f32>,
}

struct Slot {
    generation: u32,
    entry: Option<NodeEntry>,
}

pub struct AudioContext {
    sample_rate: f32,
    frame: u64,
    state: ContextState,
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    spare: Vec<NodeEntry>,
    destination: NodeId,
    // Scratch space reused across blocks
    order: Vec<usize>,
    visit_stack: Vec<(usize, bool)>,
    search_stack: Vec<NodeId>,
    visited: Vec<bool>,
    released: Vec<NodeId>,
}

impl AudioContext {
    pub fn new(sample_rate: f32) -> Self {
        let mut ctx = Self {
            sample_rate,
            frame: 0,
            state: ContextState::Running,
            slots: Vec::new(),
            free_slots: Vec::new(),
            spare: Vec::new(),
            destination: NodeId {
                index: 0,
                generation: 0,
            },
            order: Vec::new(),
            visit_stack: Vec::new(),
            search_stack: Vec::new(),
            visited: Vec::new(),
            released: Vec::new(),
        };
        let destination = ctx.acquire(NodeType::Destination);
        ctx.destination = ctx.insert(destination);
        ctx
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames rendered so far.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Context time in seconds.
    pub fn current_time(&self) -> f64 {
        self.frame as f64 / f64::from(self.sample_rate)
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn destination(&self) -> DestinationHandle {
        DestinationHandle(self.destination)
    }

    /// Number of live nodes, destination included.
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn contains(&self, node: &impl AudioNodeHandle) -> bool {
        self.entry(node.id()).is_ok()
    }

    /// Release every node and stop the clock. Rendering afterwards yields
    /// silence; creating nodes fails with `GraphError::Closed`.
    pub fn close(&mut self) {
        if self.state == ContextState::Closed {
            return;
        }
        for slot in &mut self.slots {
            if slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.free_slots.clear();
        self.spare.clear();
        self.state = ContextState::Closed;
        debug!("audio context closed at {:.3}s", self.current_time());
    }

    pub fn create_oscillator(&mut self) -> Result<OscillatorHandle, GraphError> {
        self.ensure_running()?;
        let entry = self.acquire(NodeType::Oscillator);
        Ok(OscillatorHandle(self.insert(entry)))
    }

    pub fn create_gain(&mut self) -> Result<GainHandle, GraphError> {
        self.ensure_running()?;
        let entry = self.acquire(NodeType::Gain);
        Ok(GainHandle(self.insert(entry)))
    }

    pub fn create_lowpass_filter(&mut self) -> Result<FilterHandle, GraphError> {
        self.ensure_running()?;
        let entry = self.acquire(NodeType::Filter);
        Ok(FilterHandle(self.insert(entry)))
    }

    pub fn oscillator_mut(
        &mut self,
        handle: &OscillatorHandle,
    ) -> Result<&mut OscillatorNode, GraphError> {
        match &mut self.entry_mut(handle.id())?.kind {
            NodeKind::Oscillator(node) => Ok(node),
            _ => Err(GraphError::UnknownNode(handle.id())),
        }
    }

    pub fn oscillator(&self, handle: &OscillatorHandle) -> Result<&OscillatorNode, GraphError> {
        match &self.entry(handle.id())?.kind {
            NodeKind::Oscillator(node) => Ok(node),
            _ => Err(GraphError::UnknownNode(handle.id())),
        }
    }

    pub fn gain_mut(&mut self, handle: &GainHandle) -> Result<&mut GainNode, GraphError> {
        match &mut self.entry_mut(handle.id())?.kind {
            NodeKind::Gain(node) => Ok(node),
            _ => Err(GraphError::UnknownNode(handle.id())),
        }
    }

    pub fn filter_mut(&mut self, handle: &FilterHandle) -> Result<&mut FilterNode, GraphError> {
        match &mut self.entry_mut(handle.id())?.kind {
            NodeKind::Filter(node) => Ok(node),
            _ => Err(GraphError::UnknownNode(handle.id())),
        }
    }

    /// Route `from`'s output into `to`. Connecting twice is a no-op.
    pub fn connect(
        &mut self,
        from: &impl AudioNodeHandle,
        to: &impl AudioNodeHandle,
    ) -> Result<(), GraphError> {
        self.ensure_running()?;
        let (from, to) = (from.id(), to.id());
        self.entry(from)?;

        let invalid = GraphError::InvalidConnection { from, to };
        if self.entry(to)?.kind.is_source() || from == self.destination {
            return Err(invalid);
        }
        if from == to || self.is_upstream(to, from) {
            return Err(invalid);
        }

        let inputs = &mut self.entry_mut(to)?.inputs;
        if !inputs.contains(&from) {
            inputs.push(from);
        }
        Ok(())
    }

    /// Release `node` now, along with any gain/filter node that losing it
    /// leaves without inputs. Unknown handles are ignored.
    pub(crate) fn release(&mut self, node: &impl AudioNodeHandle) {
        if node.id() == self.destination {
            return;
        }
        self.released.clear();
        self.released.push(node.id());
        self.release_pending();
    }

    /// Render `out.len()` frames of the destination's output and advance the
    /// clock by the same amount.
    pub fn render_block(&mut self, out: &mut [f32]) {
        if self.state == ContextState::Closed {
            out.fill(0.0);
            return;
        }

        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_chunk(chunk);
            self.frame += chunk.len() as u64;
            self.collect_finished();
        }
    }

    fn render_chunk(&mut self, out: &mut [f32]) {
        let len = out.len();
        let ctx = RenderCtx::new(self.sample_rate, self.current_time());

        self.update_order();

        for i in 0..self.order.len() {
            let idx = self.order[i];
            let Some(mut entry) = self.slots[idx].entry.take() else {
                continue;
            };

            let buffer = &mut entry.output[..len];
            buffer.fill(0.0);
            for input in &entry.inputs {
                if let Ok(source) = self.entry(*input) {
                    for (o, s) in buffer.iter_mut().zip(&source.output[..len]) {
                        *o += s;
                    }
                }
            }

            match &mut entry.kind {
                NodeKind::Oscillator(node) => node.process(buffer, &ctx),
                NodeKind::Gain(node) => node.process(buffer, &ctx),
                NodeKind::Filter(node) => node.process(buffer, &ctx),
                NodeKind::Destination => {}
            }

            self.slots[idx].entry = Some(entry);
        }

        match self.entry(self.destination) {
            Ok(dest) => out.copy_from_slice(&dest.output[..len]),
            Err(_) => out.fill(0.0),
        }
    }

    /// Dependency order of everything reachable upstream of the destination.
    fn update_order(&mut self) {
        self.order.clear();
        self.visit_stack.clear();
        self.visited.clear();
        self.visited.resize(self.slots.len(), false);

        self.visit_stack.push((self.destination.index as usize, false));
        while let Some((idx, inputs_done)) = self.visit_stack.pop() {
            if inputs_done {
                self.order.push(idx);
                continue;
            }
            if self.visited[idx] {
                continue;
            }
            self.visited[idx] = true;
            self.visit_stack.push((idx, true));

            if let Some(entry) = &self.slots[idx].entry {
                for input in &entry.inputs {
                    let input_idx = input.index as usize;
                    if !self.visited[input_idx] {
                        self.visit_stack.push((input_idx, false));
                    }
                }
            }
        }
    }

    fn collect_finished(&mut self) {
        let now = self.current_time();
        self.released.clear();

        for (idx, slot) in self.slots.iter().enumerate() {
            if let Some(NodeEntry {
                kind: NodeKind::Oscillator(node),
                ..
            }) = &slot.entry
            {
                if node.has_finished(now) {
                    self.released.push(NodeId {
                        index: idx as u32,
                        generation: slot.generation,
                    });
                }
            }
        }

        if !self.released.is_empty() {
            self.release_pending();
            debug!(
                "released {} finished node(s) at {:.3}s",
                self.released.len(),
                now
            );
        }
    }

    /// Remove everything in `released`. Removing a node can orphan its
    /// downstream gain/filter nodes; those are appended and removed too.
    fn release_pending(&mut self) {
        let mut cursor = 0;
        while cursor < self.released.len() {
            let id = self.released[cursor];
            cursor += 1;
            if !self.remove(id) {
                continue;
            }

            for (idx, slot) in self.slots.iter_mut().enumerate() {
                let generation = slot.generation;
                if let Some(entry) = &mut slot.entry {
                    let before = entry.inputs.len();
                    entry.inputs.retain(|&input| input != id);
                    let orphaned = before > 0 && entry.inputs.is_empty();
                    if orphaned && matches!(entry.kind, NodeKind::Gain(_) | NodeKind::Filter(_)) {
                        self.released.push(NodeId {
                            index: idx as u32,
                            generation,
                        });
                    }
                }
            }
        }
    }

    fn is_upstream(&mut self, candidate: NodeId, of: NodeId) -> bool {
        let mut stack = std::mem::take(&mut self.search_stack);
        stack.clear();
        stack.push(of);
        self.visited.clear();
        self.visited.resize(self.slots.len(), false);

        let mut found = false;
        while let Some(id) = stack.pop() {
            if id == candidate {
                found = true;
                break;
            }
            let idx = id.index as usize;
            if std::mem::replace(&mut self.visited[idx], true) {
                continue;
            }
            if let Ok(entry) = self.entry(id) {
                stack.extend(entry.inputs.iter().copied());
            }
        }

        self.search_stack = stack;
        found
    }

    /// A reset spare of the requested type, or a newly allocated one.
    fn acquire(&mut self, node_type: NodeType) -> NodeEntry {
        if let Some(pos) = self
            .spare
            .iter()
            .position(|entry| entry.kind.node_type() == node_type)
        {
            let mut entry = self.spare.swap_remove(pos);
            entry.kind.reset();
            entry.inputs.clear();
            return entry;
        }

        let kind = match node_type {
            NodeType::Oscillator => NodeKind::Oscillator(OscillatorNode::new()),
            NodeType::Gain => NodeKind::Gain(GainNode::new()),
            NodeType::Filter => NodeKind::Filter(FilterNode::lowpass()),
            NodeType::Destination => NodeKind::Destination,
        };
        NodeEntry {
            kind,
            inputs: Vec::with_capacity(4),
            output: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    fn insert(&mut self, entry: NodeEntry) -> NodeId {
        match self.free_slots.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some(entry);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                NodeId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    /// Move a live node into the spare pool. False if `id` is stale.
    fn remove(&mut self, id: NodeId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return false;
        };
        if slot.generation != id.generation {
            return false;
        }
        let Some(entry) = slot.entry.take() else {
            return false;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(id.index);
        self.spare.push(entry);
        true
    }

    fn entry(&self, id: NodeId) -> Result<&NodeEntry, GraphError> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
            .ok_or(GraphError::UnknownNode(id))
    }

    fn entry_mut(&mut self, id: NodeId) -> Result<&mut NodeEntry, GraphError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
            .ok_or(GraphError::UnknownNode(id))
    }

    fn ensure_running(&self) -> Result<(), GraphError> {
        match self.state {
            ContextState::Running => Ok(()),
            ContextState::Closed => Err(GraphError::Closed),
        }
    }
}

impl Drop for AudioContext {
    fn drop(&mut self) {
        self.close();
    }
}
