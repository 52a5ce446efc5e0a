use fxhash::FxHashMap;

use super::constants::TRIGGER_BIT_PREFIX;

/// The predefined scalar outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    EvTypeBits,
    EvType,
    CTimeL,
    CTimeR,
    Pulser1,
    SynchAdc1,
    SynchAdc2,
    SynchAdc3,
    SynchAdc4,
    SynchAdc14,
    Timestamp,
    TimeRoc1,
    TimeRoc2,
    TimeRoc3,
    TimeRoc4,
    TimeRoc14,
    RfTime1,
    RfTime2,
    EdtpL,
    EdtpR,
    LenRoc12,
    LenRoc16,
}

pub const N_SCALARS: usize = 22;

/// Definition of a predefined scalar: the global variable it is published as,
/// and the Location (if any) that feeds it.
#[derive(Debug, Clone, Copy)]
pub struct ScalarDef {
    pub scalar: Scalar,
    pub var_name: &'static str,
    pub description: &'static str,
    pub location: Option<&'static str>,
}

const fn def(
    scalar: Scalar,
    var_name: &'static str,
    description: &'static str,
    location: Option<&'static str>,
) -> ScalarDef {
    ScalarDef {
        scalar,
        var_name,
        description,
        location,
    }
}

pub static SCALAR_DEFS: [ScalarDef; N_SCALARS] = [
    def(Scalar::EvTypeBits, "evtypebits", "event type bit pattern", None),
    def(Scalar::EvType, "evtype", "event type from bit pattern", None),
    def(Scalar::CTimeL, "ctimel", "coincidence time on L-arm", Some("ctimel")),
    def(Scalar::CTimeR, "ctimer", "coincidence time on R-arm", Some("ctimer")),
    def(Scalar::Pulser1, "pulser1", "pulser in a TDC", Some("pulser1")),
    def(Scalar::SynchAdc1, "synchadc1", "synch check adc 1", Some("synchadc1")),
    def(Scalar::SynchAdc2, "synchadc2", "synch check adc 2", Some("synchadc2")),
    def(Scalar::SynchAdc3, "synchadc3", "synch check adc 3", Some("synchadc3")),
    def(Scalar::SynchAdc4, "synchadc4", "synch check adc 4", Some("synchadc4")),
    def(Scalar::SynchAdc14, "synchadc14", "synch check adc 14", Some("synchadc14")),
    def(Scalar::Timestamp, "times100k", "100kHz time stamp", Some("timestamp")),
    def(Scalar::TimeRoc1, "timeroc1", "time stamp roc 1", Some("timeroc1")),
    def(Scalar::TimeRoc2, "timeroc2", "time stamp roc 2", Some("timeroc2")),
    def(Scalar::TimeRoc3, "timeroc3", "time stamp roc 3", Some("timeroc3")),
    def(Scalar::TimeRoc4, "timeroc4", "time stamp roc 4", Some("timeroc4")),
    def(Scalar::TimeRoc14, "timeroc14", "time stamp roc 14", Some("timeroc14")),
    def(Scalar::RfTime1, "rftime1", "RF time copy 1", Some("rftime1")),
    def(Scalar::RfTime2, "rftime2", "RF time copy 2", Some("rftime2")),
    def(Scalar::EdtpL, "edtpl", "EDT pulser on L-arm", Some("edtpl")),
    def(Scalar::EdtpR, "edtpr", "EDT pulser on R-arm", Some("edtpr")),
    def(Scalar::LenRoc12, "lenroc12", "ROC12 event length", None),
    def(Scalar::LenRoc16, "lenroc16", "ROC16 event length", None),
];

impl Scalar {
    pub fn def(&self) -> &'static ScalarDef {
        &SCALAR_DEFS[*self as usize]
    }

    pub fn var_name(&self) -> &'static str {
        self.def().var_name
    }

    /// Time stamps are the only scalars read from marker-relative Locations
    pub fn is_time_stamp(&self) -> bool {
        matches!(
            self,
            Self::Timestamp
                | Self::TimeRoc1
                | Self::TimeRoc2
                | Self::TimeRoc3
                | Self::TimeRoc4
                | Self::TimeRoc14
        )
    }
}

/// Where the data of a Location ends up after decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Scalar(Scalar),
    /// Trigger bit with index >= 1
    TriggerBit(u32),
}

/// Dispatch table from Location name to Output.
///
/// Built once; Locations are routed by a single lookup when they are registered.
#[derive(Debug, Clone)]
pub struct OutputTable {
    map: FxHashMap<&'static str, Output>,
}

impl Default for OutputTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputTable {
    pub fn new() -> Self {
        let mut map = FxHashMap::default();
        for scalar_def in SCALAR_DEFS.iter() {
            if let Some(loc_name) = scalar_def.location {
                map.insert(loc_name, Output::Scalar(scalar_def.scalar));
            }
        }
        Self { map }
    }

    /// Find the Output for a Location name. Names of the form `bitN` (N >= 1) are trigger bits.
    pub fn lookup(&self, name: &str) -> Option<Output> {
        if let Some(output) = self.map.get(name) {
            return Some(*output);
        }
        name.strip_prefix(TRIGGER_BIT_PREFIX)
            .and_then(|idx| idx.parse::<u32>().ok())
            .filter(|idx| *idx >= 1)
            .map(Output::TriggerBit)
    }

    /// Predefined scalars get no generic global variable
    pub fn is_predefined_scalar(&self, name: &str) -> bool {
        matches!(self.map.get(name), Some(Output::Scalar(_)))
    }
}

/// Current event values of all predefined scalars
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scalars {
    values: [u32; N_SCALARS],
}

impl Scalars {
    pub fn get(&self, scalar: Scalar) -> u32 {
        self.values[scalar as usize]
    }

    pub fn set(&mut self, scalar: Scalar, value: u32) {
        self.values[scalar as usize] = value;
    }

    pub fn clear(&mut self) {
        self.values = [0; N_SCALARS];
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static ScalarDef, u32)> + '_ {
        SCALAR_DEFS.iter().zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defs_are_indexed_by_scalar() {
        for (idx, scalar_def) in SCALAR_DEFS.iter().enumerate() {
            assert_eq!(scalar_def.scalar as usize, idx);
        }
        assert_eq!(Scalar::Timestamp.var_name(), "times100k");
    }

    #[test]
    fn test_time_stamp_family() {
        let stamps: Vec<&str> = SCALAR_DEFS
            .iter()
            .filter(|d| d.scalar.is_time_stamp())
            .map(|d| d.var_name)
            .collect();
        assert_eq!(
            stamps,
            vec!["times100k", "timeroc1", "timeroc2", "timeroc3", "timeroc4", "timeroc14"]
        );
    }

    #[test]
    fn test_lookup() {
        let table = OutputTable::new();
        assert_eq!(
            table.lookup("timestamp"),
            Some(Output::Scalar(Scalar::Timestamp))
        );
        assert_eq!(table.lookup("bit3"), Some(Output::TriggerBit(3)));
        assert_eq!(table.lookup("bit40"), Some(Output::TriggerBit(40)));
        assert_eq!(table.lookup("bit0"), None);
        assert_eq!(table.lookup("bitter"), None);
        assert_eq!(table.lookup("evtype"), None);
        assert_eq!(table.lookup("foo"), None);
        assert!(table.is_predefined_scalar("ctimel"));
        assert!(!table.is_predefined_scalar("bit1"));
    }

    #[test]
    fn test_scalars() {
        let mut scalars = Scalars::default();
        scalars.set(Scalar::RfTime2, 12);
        assert_eq!(scalars.get(Scalar::RfTime2), 12);
        assert_eq!(
            scalars.iter().find(|(d, _)| d.var_name == "rftime2").map(|(_, v)| v),
            Some(12)
        );
        scalars.clear();
        assert_eq!(scalars.get(Scalar::RfTime2), 0);
    }
}
