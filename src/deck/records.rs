//! Typed keyword records as produced by the deck decoder
//!
//! Items that the deck may default are `Option`s; `None` means defaulted.
//! Mode items stay as their deck spelling and are parsed by the handlers so
//! that a bad spelling surfaces as a malformed record rather than a decode
//! failure.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ============================================================================
// Keyword Envelope
// ============================================================================

/// One keyword with its records, tagged by the keyword name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "keyword", rename_all = "UPPERCASE")]
pub enum DeckKeyword {
    // Time advance
    Dates { dates: Vec<NaiveDateTime> },
    Tstep { days: Vec<f64> },

    // Wells
    Welspecs { records: Vec<WelspecsRecord> },
    Wconprod { records: Vec<WconprodRecord> },
    Wconhist { records: Vec<WconhistRecord> },
    Wconinje { records: Vec<WconinjeRecord> },
    Wconinjh { records: Vec<WconinjhRecord> },
    Whistctl(WhistctlRecord),
    Welopen { records: Vec<WelopenRecord> },
    Weltarg { records: Vec<WeltargRecord> },
    Wefac { records: Vec<WefacRecord> },
    Wlist { records: Vec<WlistRecord> },
    Wgrupcon { records: Vec<WgrupconRecord> },
    Wpolymer { records: Vec<WpolymerRecord> },
    Wsolvent { records: Vec<WsolventRecord> },
    Wtracer { records: Vec<WtracerRecord> },
    Wfoam { records: Vec<WfoamRecord> },
    Wtemp { records: Vec<WtempRecord> },
    Wtest { records: Vec<WtestRecord> },

    // Completions
    Compdat { records: Vec<CompdatRecord> },
    Complump { records: Vec<ComplumpRecord> },

    // Groups
    Gruptree { records: Vec<GruptreeRecord> },
    Gconprod { records: Vec<GconprodRecord> },
    Gconinje { records: Vec<GconinjeRecord> },
    Gefac { records: Vec<GefacRecord> },

    // Output
    Wrft { records: Vec<WrftRecord> },
    Wrftplt { records: Vec<WrftpltRecord> },
    Rptrst(MnemonicRecord),
    Rptsched(MnemonicRecord),

    // Tables
    Vfpprod(VfpRecord),
    Vfpinj(VfpRecord),

    // Numerical controls
    Drsdt(DrsdtRecord),
    Drvdt(DrvdtRecord),
    Vappars(VapparsRecord),
    Tuning(TuningRecord),
}

impl DeckKeyword {
    /// Deck spelling of the keyword
    pub fn name(&self) -> &'static str {
        match self {
            DeckKeyword::Dates { .. } => "DATES",
            DeckKeyword::Tstep { .. } => "TSTEP",
            DeckKeyword::Welspecs { .. } => "WELSPECS",
            DeckKeyword::Wconprod { .. } => "WCONPROD",
            DeckKeyword::Wconhist { .. } => "WCONHIST",
            DeckKeyword::Wconinje { .. } => "WCONINJE",
            DeckKeyword::Wconinjh { .. } => "WCONINJH",
            DeckKeyword::Whistctl(_) => "WHISTCTL",
            DeckKeyword::Welopen { .. } => "WELOPEN",
            DeckKeyword::Weltarg { .. } => "WELTARG",
            DeckKeyword::Wefac { .. } => "WEFAC",
            DeckKeyword::Wlist { .. } => "WLIST",
            DeckKeyword::Wgrupcon { .. } => "WGRUPCON",
            DeckKeyword::Wpolymer { .. } => "WPOLYMER",
            DeckKeyword::Wsolvent { .. } => "WSOLVENT",
            DeckKeyword::Wtracer { .. } => "WTRACER",
            DeckKeyword::Wfoam { .. } => "WFOAM",
            DeckKeyword::Wtemp { .. } => "WTEMP",
            DeckKeyword::Wtest { .. } => "WTEST",
            DeckKeyword::Compdat { .. } => "COMPDAT",
            DeckKeyword::Complump { .. } => "COMPLUMP",
            DeckKeyword::Gruptree { .. } => "GRUPTREE",
            DeckKeyword::Gconprod { .. } => "GCONPROD",
            DeckKeyword::Gconinje { .. } => "GCONINJE",
            DeckKeyword::Gefac { .. } => "GEFAC",
            DeckKeyword::Wrft { .. } => "WRFT",
            DeckKeyword::Wrftplt { .. } => "WRFTPLT",
            DeckKeyword::Rptrst(_) => "RPTRST",
            DeckKeyword::Rptsched(_) => "RPTSCHED",
            DeckKeyword::Vfpprod(_) => "VFPPROD",
            DeckKeyword::Vfpinj(_) => "VFPINJ",
            DeckKeyword::Drsdt(_) => "DRSDT",
            DeckKeyword::Drvdt(_) => "DRVDT",
            DeckKeyword::Vappars(_) => "VAPPARS",
            DeckKeyword::Tuning(_) => "TUNING",
        }
    }

    pub fn is_time_advance(&self) -> bool {
        matches!(self, DeckKeyword::Dates { .. } | DeckKeyword::Tstep { .. })
    }
}

// ============================================================================
// Well Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WelspecsRecord {
    pub well: String,
    pub group: String,
    /// 1-based head I
    pub head_i: Option<i32>,
    /// 1-based head J
    pub head_j: Option<i32>,
    pub ref_depth: Option<f64>,
    pub phase: Option<String>,
    /// `YES` or `NO`
    pub crossflow: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WconprodRecord {
    pub well: String,
    pub status: Option<String>,
    pub cmode: Option<String>,
    pub orat: Option<f64>,
    pub wrat: Option<f64>,
    pub grat: Option<f64>,
    pub lrat: Option<f64>,
    pub resv: Option<f64>,
    pub bhp: Option<f64>,
    pub thp: Option<f64>,
    pub vfp_table: Option<i32>,
    pub alq: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WconhistRecord {
    pub well: String,
    pub status: Option<String>,
    pub cmode: Option<String>,
    pub orat: Option<f64>,
    pub wrat: Option<f64>,
    pub grat: Option<f64>,
    pub vfp_table: Option<i32>,
    pub alq: Option<f64>,
    pub thp: Option<f64>,
    pub bhp: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WconinjeRecord {
    pub well: String,
    pub injector_type: Option<String>,
    pub status: Option<String>,
    pub cmode: Option<String>,
    pub rate: Option<f64>,
    pub resv: Option<f64>,
    pub bhp: Option<f64>,
    pub thp: Option<f64>,
    pub vfp_table: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WconinjhRecord {
    pub well: String,
    pub injector_type: Option<String>,
    pub status: Option<String>,
    pub rate: Option<f64>,
    pub bhp: Option<f64>,
    pub thp: Option<f64>,
    pub cmode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WhistctlRecord {
    pub cmode: Option<String>,
    /// `YES` asks the simulator to stop on a BHP violation
    pub bhp_terminate: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WelopenRecord {
    pub well: String,
    pub status: Option<String>,
    pub i: Option<i32>,
    pub j: Option<i32>,
    pub k: Option<i32>,
    pub c1: Option<i32>,
    pub c2: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WeltargRecord {
    pub well: String,
    pub cmode: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WefacRecord {
    pub well: String,
    pub efficiency_factor: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WlistRecord {
    pub name: String,
    pub action: String,
    #[serde(default)]
    pub wells: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WgrupconRecord {
    pub well: String,
    pub group_controlled: Option<String>,
    pub guide_rate: Option<f64>,
    pub phase: Option<String>,
    pub scaling_factor: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WpolymerRecord {
    pub well: String,
    pub polymer_concentration: Option<f64>,
    pub salt_concentration: Option<f64>,
    pub group_polymer_concentration: Option<String>,
    pub group_salt_concentration: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WsolventRecord {
    pub well: String,
    pub solvent_fraction: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WtracerRecord {
    pub well: String,
    pub tracer: String,
    pub concentration: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WfoamRecord {
    pub well: String,
    pub foam_concentration: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WtempRecord {
    pub well: String,
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WtestRecord {
    pub well: String,
    /// Days between retests
    pub interval: Option<f64>,
    /// Reason characters out of `P`, `E`, `G`, `D`, `C`
    pub reasons: Option<String>,
    pub num_tests: Option<i32>,
    pub startup_time: Option<f64>,
}

// ============================================================================
// Completion Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CompdatRecord {
    pub well: String,
    pub i: Option<i32>,
    pub j: Option<i32>,
    pub k1: Option<i32>,
    pub k2: Option<i32>,
    pub state: Option<String>,
    pub sat_table: Option<i32>,
    pub connection_factor: Option<f64>,
    pub diameter: Option<f64>,
    pub kh: Option<f64>,
    pub skin: Option<f64>,
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ComplumpRecord {
    pub well: String,
    pub i: Option<i32>,
    pub j: Option<i32>,
    pub k1: Option<i32>,
    pub k2: Option<i32>,
    pub complnum: Option<i32>,
}

// ============================================================================
// Group Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GruptreeRecord {
    pub child: String,
    pub parent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GconprodRecord {
    pub group: String,
    pub cmode: Option<String>,
    pub oil_target: Option<f64>,
    pub water_target: Option<f64>,
    pub gas_target: Option<f64>,
    pub liquid_target: Option<f64>,
    pub resv_target: Option<f64>,
    pub exceed_action: Option<String>,
    pub guide_rate: Option<f64>,
    pub guide_rate_def: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GconinjeRecord {
    pub group: String,
    pub phase: Option<String>,
    pub cmode: Option<String>,
    pub surface_target: Option<f64>,
    pub resv_target: Option<f64>,
    pub reinject_target: Option<f64>,
    pub voidage_target: Option<f64>,
    pub guide_rate: Option<f64>,
    pub guide_rate_def: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GefacRecord {
    pub group: String,
    pub efficiency_factor: Option<f64>,
    pub transfer_to_network: Option<String>,
}

// ============================================================================
// Output Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WrftRecord {
    pub well: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WrftpltRecord {
    pub well: String,
    /// `YES`, `REPT`, `TIMESTEP`, `FOPN` or `NO`
    pub output_rft: Option<String>,
}

/// Mnemonic list of `RPTRST`/`RPTSCHED`, e.g. `["BASIC=3", "FREQ=2"]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MnemonicRecord {
    #[serde(default)]
    pub mnemonics: Vec<String>,
}

// ============================================================================
// Table Records
// ============================================================================

/// A lookup table definition. Injection tables leave the water, gas and
/// lift axes empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VfpRecord {
    pub table: i32,
    pub datum_depth: Option<f64>,
    #[serde(default)]
    pub flow_values: Vec<f64>,
    #[serde(default)]
    pub thp_values: Vec<f64>,
    #[serde(default)]
    pub wfr_values: Vec<f64>,
    #[serde(default)]
    pub gfr_values: Vec<f64>,
    #[serde(default)]
    pub alq_values: Vec<f64>,
    #[serde(default)]
    pub values: Vec<f64>,
}

// ============================================================================
// Numerical Control Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DrsdtRecord {
    pub max_rate: Option<f64>,
    /// `ALL` or `FREE`
    pub option: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DrvdtRecord {
    pub max_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VapparsRecord {
    pub oil_vap_propensity: Option<f64>,
    pub oil_density_propensity: Option<f64>,
}

/// The three `TUNING` records flattened; missing items take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TuningRecord {
    pub tsinit: Option<f64>,
    pub tsmaxz: Option<f64>,
    pub tsminz: Option<f64>,
    pub tsmchp: Option<f64>,
    pub tsfmax: Option<f64>,
    pub tsfmin: Option<f64>,
    pub tsfcnv: Option<f64>,
    pub tfdiff: Option<f64>,
    pub thrupt: Option<f64>,
    pub tmaxwc: Option<f64>,
    pub trgtte: Option<f64>,
    pub trgcnv: Option<f64>,
    pub trgmbe: Option<f64>,
    pub trglcv: Option<f64>,
    pub xxxtte: Option<f64>,
    pub xxxcnv: Option<f64>,
    pub xxxmbe: Option<f64>,
    pub xxxlcv: Option<f64>,
    pub xxxwfl: Option<f64>,
    pub trgfip: Option<f64>,
    pub newtmx: Option<i32>,
    pub newtmn: Option<i32>,
    pub litmax: Option<i32>,
    pub litmin: Option<i32>,
    pub mxwsit: Option<i32>,
    pub mxwpit: Option<i32>,
}
