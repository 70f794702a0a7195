//! Cause catalog - the static knowledge base for hardware triage.
//!
//! An ordered list of `{cause, keywords, action}` records. Order matters:
//! the matcher breaks scoring ties in catalog order, and the power-supply
//! record is first because it backs the critical-override path.

/// One root-cause category with its trigger keywords and remediation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CauseRecord {
    pub cause: &'static str,
    pub keywords: &'static [&'static str],
    pub action: &'static str,
}

/// Cause name of the power-supply record (critical-override target).
pub const POWER_SUPPLY_CAUSE: &str = "Power Supply Unit (PSU) or Power Cable Issue";

/// Builtin catalog. No two records share a cause name.
const BUILTIN_RECORDS: &[CauseRecord] = &[
    // Critical: no power / hardware failure
    CauseRecord {
        cause: POWER_SUPPLY_CAUSE,
        keywords: &["no power", "won't turn on", "dead", "power issue", "no light", "off"],
        action: "Check the power cable connection to the wall and the device. Try a different power outlet or a different cable (if available). If the issue persists, the internal power supply unit (PSU) or power board has failed and requires professional service.",
    },
    // Printing/scanning errors
    CauseRecord {
        cause: "Driver/Software Communication or Paper Jam",
        keywords: &["print error", "jam", "offline", "communication", "not printing", "scans blank"],
        action: "Clear any visible or internal paper jams. Reinstall the printer drivers. If connected via Wi-Fi, run the manufacturer's network setup utility to confirm the connection status.",
    },
    CauseRecord {
        cause: "Empty Ink/Toner Cartridge or Low Tank Levels",
        keywords: &["faded", "blank pages", "no color", "empty ink", "low ink", "toner low"],
        action: "Replace the indicated ink or toner cartridge, or refill the specific ink tank to the required level. Run a print head cleaning cycle if colors are still inconsistent after replacement/refill.",
    },
    CauseRecord {
        cause: "Clogged Print Head (Inkjet)",
        keywords: &["streaks", "missing lines", "banding", "poor quality", "clogged"],
        action: "Run two cycles of 'Print Head Cleaning' from the printer utility software or the printer's maintenance menu. If the problem persists, try a 'Deep Cleaning' cycle.",
    },
    CauseRecord {
        cause: "Fuser Unit Failure (Laser)",
        keywords: &["smudging", "smears", "wipes off", "not fixing", "powder"],
        action: "The toner is not being properly fused to the paper. This usually indicates a failure in the fuser unit, which is a key component in laser printers and often requires replacement.",
    },
    // Connectivity
    CauseRecord {
        cause: "Wi-Fi Connection Loss or Incorrect Password",
        keywords: &["wifi error", "disconnected", "no internet", "network", "can't see"],
        action: "Restart the router and the printer. Re-enter the Wi-Fi password on the printer's control panel. Ensure the printer is on the same 2.4GHz network as the computer/phone.",
    },
    CauseRecord {
        cause: "USB Port/Cable Malfunction",
        keywords: &["usb disconnect", "not recognized", "cable fault"],
        action: "Try connecting the printer to a different USB port on your computer. If the issue continues, replace the USB cable (ensure it is rated USB 2.0 or higher).",
    },
    // Operating system / software
    CauseRecord {
        cause: "Operating System Update Incompatibility",
        keywords: &["after update", "os update", "windows 11", "macos sonoma"],
        action: "Check the manufacturer's website for the latest drivers compatible with your recent OS update. Completely remove old drivers before installing the new ones.",
    },
];

/// Immutable ordered cause catalog.
#[derive(Debug, Clone, Copy)]
pub struct CauseCatalog {
    records: &'static [CauseRecord],
}

impl Default for CauseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CauseCatalog {
    /// The builtin hardware-support catalog.
    pub fn builtin() -> Self {
        Self { records: BUILTIN_RECORDS }
    }

    pub fn records(&self) -> &[CauseRecord] {
        self.records
    }

    /// All cause names, in stable catalog order. This is also the option
    /// list the rendering layer offers at diagnosis confirmation.
    pub fn all_causes(&self) -> Vec<&'static str> {
        self.records.iter().map(|r| r.cause).collect()
    }

    /// Remediation action for a cause name, or None if the cause is unknown.
    pub fn action_for(&self, cause: &str) -> Option<&'static str> {
        self.records.iter().find(|r| r.cause == cause).map(|r| r.action)
    }

    /// The record backing the critical power override, if present.
    pub fn power_supply_record(&self) -> Option<&CauseRecord> {
        self.records.iter().find(|r| r.cause == POWER_SUPPLY_CAUSE)
    }
}
