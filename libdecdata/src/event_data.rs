use fxhash::FxHashMap;

/// Access to the raw data of one event, as provided by the event decoder of the DAQ.
///
/// Out-of-range requests return 0 rather than failing, which is how the front-end
/// decoders behave for channels that did not fire.
pub trait EventData {
    /// Number of hits at (crate, slot, channel)
    fn num_hits(&self, crate_id: u32, slot: u32, channel: u32) -> usize;
    /// Value of hit `index` at (crate, slot, channel)
    fn hit_value(&self, crate_id: u32, slot: u32, channel: u32, index: usize) -> u32;
    /// Raw word at `position` in the buffer of a readout controller
    fn raw_word(&self, crate_id: u32, position: usize) -> u32;
    /// Number of words in the buffer of a readout controller
    fn roc_length(&self, crate_id: u32) -> usize;
    fn event_type(&self) -> u32;
}

/// An in-memory event, used to replay or synthesize data.
#[derive(Debug, Clone, Default)]
pub struct SimEvent {
    event_type: u32,
    hits: FxHashMap<(u32, u32, u32), Vec<u32>>,
    rocs: FxHashMap<u32, Vec<u32>>,
}

impl SimEvent {
    pub fn new(event_type: u32) -> Self {
        Self {
            event_type,
            ..Default::default()
        }
    }

    /// Append a hit at (crate, slot, channel)
    pub fn add_hit(&mut self, crate_id: u32, slot: u32, channel: u32, value: u32) -> &mut Self {
        self.hits
            .entry((crate_id, slot, channel))
            .or_default()
            .push(value);
        self
    }

    /// Replace the raw buffer of a readout controller
    pub fn set_roc_words(&mut self, crate_id: u32, words: Vec<u32>) -> &mut Self {
        self.rocs.insert(crate_id, words);
        self
    }

    pub fn set_event_type(&mut self, event_type: u32) -> &mut Self {
        self.event_type = event_type;
        self
    }
}

impl EventData for SimEvent {
    fn num_hits(&self, crate_id: u32, slot: u32, channel: u32) -> usize {
        self.hits
            .get(&(crate_id, slot, channel))
            .map_or(0, |hits| hits.len())
    }

    fn hit_value(&self, crate_id: u32, slot: u32, channel: u32, index: usize) -> u32 {
        self.hits
            .get(&(crate_id, slot, channel))
            .and_then(|hits| hits.get(index))
            .copied()
            .unwrap_or(0)
    }

    fn raw_word(&self, crate_id: u32, position: usize) -> u32 {
        self.rocs
            .get(&crate_id)
            .and_then(|words| words.get(position))
            .copied()
            .unwrap_or(0)
    }

    fn roc_length(&self, crate_id: u32) -> usize {
        self.rocs.get(&crate_id).map_or(0, |words| words.len())
    }

    fn event_type(&self) -> u32 {
        self.event_type
    }
}
