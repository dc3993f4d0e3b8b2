//! Plain-text rendering of optimization results.

use std::fmt;

use water_opt::{catalog, Ion, Optimization, Outcome};

/// Terminal view of one result.
pub struct Report<'a>(pub &'a Optimization);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        let display = &result.display;

        writeln!(f, "Volume: {} L", result.volume)?;
        if let Outcome::Infeasible { reason } = &result.outcome {
            writeln!(f, "No feasible additions: {}", reason)?;
        }

        writeln!(f, "\nAdditions:")?;
        for (id, grams) in display.masses.iter() {
            writeln!(f, "  {:<18} {:>8.1} g", id.to_string(), grams)?;
        }

        writeln!(f, "\n  {:<5} {:>9} {:>9}", "Ion", "Result", "Off by")?;
        for ion in Ion::ALL {
            writeln!(
                f,
                "  {:<5} {:>9.1} {:>+9.1}",
                ion.symbol(),
                display.achieved.get(ion),
                display.deviation.get(ion)
            )?;
        }

        writeln!(f, "\nSquared error: {:.3}", result.squared_error)
    }
}

/// The additive catalog as a table.
pub struct CatalogTable;

impl fmt::Display for CatalogTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<18} {:<8} {:>10}  ppm per g/L",
            "Additive", "Formula", "Max g/L"
        )?;
        for additive in catalog() {
            let ions: Vec<String> = additive
                .contributions()
                .iter()
                .map(|(ion, ppm)| format!("{} {:.2}", ion.symbol(), ppm))
                .collect();
            writeln!(
                f,
                "{:<18} {:<8} {:>10.1}  {}",
                additive.name,
                additive.formula,
                additive.solubility_g_per_l,
                ions.join(", ")
            )?;
        }
        Ok(())
    }
}
