use time::Date;

use super::channel_map::{load_locations, LoadMode, LoadReport};
use super::config::DecDataConfig;
use super::constants::ROC_LENGTH_CRATES;
use super::efficiency::{PlaneWires, VdcEfficiency};
use super::error::{DecDataError, DecodeError, HistogramError, VariableError};
use super::event_data::EventData;
use super::histogram::{HistDef, HistogramSink, YamlHistogramWriter, H1};
use super::location::{Address, Location};
use super::outputs::{Output, OutputTable, Scalar, Scalars, SCALAR_DEFS};
use super::registry::{LocationId, LocationRegistry};
use super::trigger_bits::TriggerBits;
use super::variables::{GlobalVar, VarTarget, VariableRegistry};

const ROC_LENGTH_HISTS: [HistDef; 2] = [
    HistDef {
        name: "Lenroc12",
        title: "Event length in ROC12",
        nbins: 500,
        xmin: 0.0,
        xmax: 5000.0,
    },
    HistDef {
        name: "Lenroc16",
        title: "Event length in ROC16",
        nbins: 500,
        xmin: 0.0,
        xmax: 5000.0,
    },
];

const ROC_LENGTH_SCALARS: [Scalar; 2] = [Scalar::LenRoc12, Scalar::LenRoc16];

/// The value behind a global variable for the current event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarValue<'a> {
    Scalar(u32),
    /// Hits of a generic Location. Its hit count is the slice length.
    Channel(&'a [u32]),
}

/// DecData decodes the miscellaneous per-event data of the spectrometer: synch checks,
/// time stamps, coincidence times and the trigger bit pattern, plus any other channel
/// named in the mapping file. It also accumulates the online VDC wire efficiency.
///
/// A DecData publishes its outputs to a VariableRegistry. Only one DecData may publish to a
/// given registry at a time.
#[derive(Debug)]
pub struct DecData {
    config: DecDataConfig,
    initialized: bool,
    registry: LocationRegistry,
    outputs: OutputTable,
    routes: Vec<(LocationId, Output)>,
    generic_vars: Vec<String>,
    scalars: Scalars,
    trigger_bits: TriggerBits,
    efficiency: VdcEfficiency,
    roc_hists: Vec<H1>,
    sink: Option<Box<dyn HistogramSink>>,
}

impl DecData {
    /// Create the decoder and define its predefined variables in `vars`.
    ///
    /// Fails without touching `vars` if any predefined variable is already defined there.
    pub fn new(
        config: DecDataConfig,
        vars: &mut dyn VariableRegistry,
    ) -> Result<Self, DecDataError> {
        for scalar_def in SCALAR_DEFS.iter() {
            let name = format!("{}{}", config.prefix, scalar_def.var_name);
            if vars.is_defined(&name) {
                return Err(VariableError::AlreadyDefined(name).into());
            }
        }
        for scalar_def in SCALAR_DEFS.iter() {
            vars.define(
                &format!("{}{}", config.prefix, scalar_def.var_name),
                scalar_def.description,
                VarTarget::Scalar(scalar_def.scalar),
            )?;
        }

        let sink = config
            .histogram_path
            .as_ref()
            .map(|path| Box::new(YamlHistogramWriter::new(path)) as Box<dyn HistogramSink>);

        Ok(Self {
            config,
            initialized: false,
            registry: LocationRegistry::new(),
            outputs: OutputTable::new(),
            routes: Vec::new(),
            generic_vars: Vec::new(),
            scalars: Scalars::default(),
            trigger_bits: TriggerBits::default(),
            efficiency: VdcEfficiency::new(),
            roc_hists: ROC_LENGTH_HISTS.iter().map(H1::from_def).collect(),
            sink,
        })
    }

    /// Load the Location map for a run taken on `run_date`.
    ///
    /// The first call populates the registry. Later calls merge the mapping into the existing
    /// Locations, keeping every variable binding, and keep the accumulated VDC statistics.
    pub fn init(
        &mut self,
        vars: &mut dyn VariableRegistry,
        run_date: Date,
    ) -> Result<LoadReport, DecDataError> {
        let mode = if self.initialized {
            LoadMode::Reinitialize
        } else {
            LoadMode::Fresh
        };
        let candidates = self.config.candidate_files(run_date);
        let report = load_locations(&mut self.registry, &candidates, mode)?;
        for id in report.inserted.iter() {
            self.register_location(*id, vars);
        }
        self.efficiency.begin(mode == LoadMode::Fresh);
        self.initialized = true;

        spdlog::info!(
            "DecData initialized for {} with {} locations ({} new, {} updated)",
            run_date,
            self.registry.len(),
            report.inserted.len(),
            report.updated.len()
        );
        Ok(report)
    }

    /// Route a newly inserted Location and give it a generic variable unless it feeds a
    /// predefined scalar.
    fn register_location(&mut self, id: LocationId, vars: &mut dyn VariableRegistry) {
        let Some(location) = self.registry.get(id) else {
            return;
        };
        if let Some(output) = self.outputs.lookup(location.name()) {
            self.routes.push((id, output));
        }
        if self.outputs.is_predefined_scalar(location.name()) {
            return;
        }
        let var_name = format!("{}{}", self.config.prefix, location.name());
        match vars.define(
            &var_name,
            &location.address().to_string(),
            VarTarget::Channel(id),
        ) {
            Ok(()) => self.generic_vars.push(var_name),
            Err(e) => spdlog::warn!("Could not define variable for {}: {e}", location.name()),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Replace the destination of the monitoring histograms
    pub fn set_histogram_sink(&mut self, sink: Box<dyn HistogramSink>) {
        self.sink = Some(sink);
    }

    /// Forget the current event
    pub fn clear(&mut self) {
        self.scalars.clear();
        self.trigger_bits.clear();
        self.registry.clear_samples();
    }

    /// Clear the event and zero all accumulated histograms and VDC statistics
    pub fn reset(&mut self) {
        self.clear();
        self.roc_hists.iter_mut().for_each(|h| h.reset());
        self.efficiency.begin(true);
    }

    /// Decode one event.
    ///
    /// `wires` holds the fired wires of each VDC plane for the efficiency accumulator.
    pub fn decode<E: EventData + ?Sized>(
        &mut self,
        event: &E,
        wires: &PlaneWires,
    ) -> Result<(), DecodeError> {
        if !self.initialized {
            return Err(DecodeError::NotInitialized);
        }
        self.clear();

        for ((crate_id, scalar), hist) in ROC_LENGTH_CRATES
            .iter()
            .zip(ROC_LENGTH_SCALARS)
            .zip(self.roc_hists.iter_mut())
        {
            let length = event.roc_length(*crate_id);
            self.scalars
                .set(scalar, u32::try_from(length).unwrap_or(u32::MAX));
            hist.fill(length as f64);
        }

        for location in self.registry.slot_locations_mut() {
            load_slot(location, event);
        }
        for location in self.registry.marker_locations_mut() {
            load_marker(location, event);
        }

        self.scalars.set(Scalar::EvType, event.event_type());

        for (id, output) in self.routes.iter() {
            let Some(location) = self.registry.get(*id) else {
                continue;
            };
            match output {
                Output::TriggerBit(index) => {
                    if location.is_slot() {
                        self.trigger_bits
                            .apply(*index, location.samples(), &self.config.trigger_cut);
                    }
                }
                Output::Scalar(scalar) => {
                    if location.is_slot() || scalar.is_time_stamp() {
                        self.scalars.set(*scalar, location.get(0));
                    }
                }
            }
        }
        self.scalars
            .set(Scalar::EvTypeBits, self.trigger_bits.pattern());

        if self.efficiency.process(wires) {
            self.write_histograms()?;
        }
        Ok(())
    }

    /// End of run: write out all monitoring histograms
    pub fn end(&mut self) -> Result<(), DecDataError> {
        self.write_histograms()?;
        Ok(())
    }

    fn write_histograms(&mut self) -> Result<(), HistogramError> {
        if let Some(sink) = self.sink.as_mut() {
            let hists: Vec<&H1> = self
                .efficiency
                .histograms()
                .chain(self.roc_hists.iter())
                .collect();
            sink.write(&hists)?;
        }
        Ok(())
    }

    /// Remove every variable this DecData defined, write the histograms a final time and
    /// release all Locations. The variables are removed even if the write fails.
    pub fn teardown(mut self, vars: &mut dyn VariableRegistry) -> Result<(), DecDataError> {
        for scalar_def in SCALAR_DEFS.iter() {
            vars.remove(&format!("{}{}", self.config.prefix, scalar_def.var_name));
        }
        for name in self.generic_vars.drain(..) {
            vars.remove(&name);
        }
        self.write_histograms()?;
        Ok(())
    }

    pub fn scalar(&self, scalar: Scalar) -> u32 {
        self.scalars.get(scalar)
    }

    pub fn scalars(&self) -> &Scalars {
        &self.scalars
    }

    pub fn trigger_bits(&self) -> &TriggerBits {
        &self.trigger_bits
    }

    pub fn location(&self, name: &str) -> Option<&Location> {
        self.registry
            .find_by_name(name)
            .and_then(|id| self.registry.get(id))
    }

    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    pub fn efficiency(&self) -> &VdcEfficiency {
        &self.efficiency
    }

    pub fn roc_length_histograms(&self) -> &[H1] {
        &self.roc_hists
    }

    pub fn config(&self) -> &DecDataConfig {
        &self.config
    }

    /// Current value of a variable published by this DecData
    pub fn read_variable(&self, var: &GlobalVar) -> Option<VarValue<'_>> {
        match var.target {
            VarTarget::Scalar(scalar) => Some(VarValue::Scalar(self.scalar(scalar))),
            VarTarget::Channel(id) => self
                .registry
                .get(id)
                .map(|location| VarValue::Channel(location.samples())),
        }
    }

    /// Human readable dump of the trigger bits and the predefined scalars
    pub fn summary(&self) -> String {
        let mut text = String::from("Trigger bits set:");
        for bit in self.trigger_bits.fired() {
            text.push_str(&format!(" {bit}"));
        }
        text.push('\n');
        for (scalar_def, value) in self.scalars.iter() {
            text.push_str(&format!(
                "{}{} = {}\n",
                self.config.prefix, scalar_def.var_name, value
            ));
        }
        text
    }
}

fn load_slot<E: EventData + ?Sized>(location: &mut Location, event: &E) {
    if let Address::Slot {
        crate_id,
        slot,
        channel,
    } = *location.address()
    {
        for index in 0..event.num_hits(crate_id, slot, channel) {
            location.load(event.hit_value(crate_id, slot, channel, index));
        }
    }
}

/// Every occurrence of the marker with a word `skip` positions later contributes that word
fn load_marker<E: EventData + ?Sized>(location: &mut Location, event: &E) {
    if let Address::Marker {
        crate_id,
        marker,
        skip,
    } = *location.address()
    {
        let length = event.roc_length(crate_id);
        for position in 0..length.saturating_sub(skip) {
            if event.raw_word(crate_id, position) == marker {
                location.load(event.raw_word(crate_id, position + skip));
            }
        }
    }
}
