use std::{collections::HashSet, path::Path};

use crate::{
    config::*,
    context::RunContext,
    error::{ResolveError, Result},
};

/// One row of the barcodes CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeSample {
    pub sample: String,
    pub barcode: String,
}

/// Check the read directory exists and record its canonical path
pub fn look_for_basecalled_reads(mut cfg: Config, ctx: &RunContext) -> Result<Config> {
    let p = cfg.read_path()?.ok_or(ResolveError::MissingReadPath)?;
    let p = ctx.resolve(p);
    if !p.is_dir() {
        return Err(ResolveError::ReadPathNotFound(p));
    }
    let p = p
        .canonicalize()
        .map_err(|e| ResolveError::io(format!("Could not resolve {}", p.display()), e))?;
    info!("Input reads: {}", p.display());
    cfg.set_path(READ_PATH, &p);
    Ok(cfg)
}

/// Check and read the optional barcodes CSV
pub fn look_for_barcodes_csv(
    mut cfg: Config,
    ctx: &RunContext,
) -> Result<(Config, Option<Vec<BarcodeSample>>)> {
    let Some(p) = cfg.barcodes_csv()? else {
        debug!("No barcodes CSV given");
        return Ok((cfg, None));
    };
    let p = ctx.resolve(p);
    if !p.is_file() {
        return Err(ResolveError::BarcodeCsv {
            path: p,
            reason: "file not found".to_string(),
        });
    }
    let p = p
        .canonicalize()
        .map_err(|e| ResolveError::io(format!("Could not resolve {}", p.display()), e))?;
    let samples = read_barcodes_csv(&p)?;
    info!("Read {} samples from {}", samples.len(), p.display());
    cfg.set_path(BARCODES_CSV, &p);
    Ok((cfg, Some(samples)))
}

/// Parse a CSV with (at least) `sample` and `barcode` columns
pub fn read_barcodes_csv(path: &Path) -> Result<Vec<BarcodeSample>> {
    let csv_err = |reason: String| ResolveError::BarcodeCsv {
        path: path.to_owned(),
        reason,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| csv_err(e.to_string()))?;

    let hdr = rdr.headers().map_err(|e| csv_err(e.to_string()))?;
    let col = |name: &str| hdr.iter().position(|h| h.eq_ignore_ascii_case(name));
    let (sample_ix, barcode_ix) = match (col("sample"), col("barcode")) {
        (Some(s), Some(b)) => (s, b),
        _ => return Err(csv_err("header must have sample and barcode columns".to_string())),
    };

    let mut seen = HashSet::new();
    let mut samples = Vec::new();
    for (ix, rec) in rdr.records().enumerate() {
        let rec = rec.map_err(|e| csv_err(e.to_string()))?;
        // Header is line 1
        let line = ix + 2;
        let get = |i: usize| rec.get(i).unwrap_or_default();
        let (sample, barcode) = (get(sample_ix), get(barcode_ix));
        if sample.is_empty() || barcode.is_empty() {
            return Err(csv_err(format!("empty sample or barcode at line {}", line)));
        }
        if !seen.insert(barcode.to_owned()) {
            return Err(csv_err(format!("barcode {} duplicated at line {}", barcode, line)));
        }
        samples.push(BarcodeSample {
            sample: sample.to_owned(),
            barcode: barcode.to_owned(),
        })
    }
    if samples.is_empty() {
        Err(csv_err("no samples listed".to_string()))
    } else {
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::test_util::Fixture;

    #[test]
    fn read_path_required() {
        let fx = Fixture::new();
        let e = look_for_basecalled_reads(get_defaults(), &fx.ctx()).unwrap_err();
        assert!(matches!(e, ResolveError::MissingReadPath));

        let mut cfg = get_defaults();
        cfg.set(READ_PATH, "no_such_dir");
        let e = look_for_basecalled_reads(cfg, &fx.ctx()).unwrap_err();
        assert!(matches!(e, ResolveError::ReadPathNotFound(p) if p == fx.cwd.join("no_such_dir")));

        // A file is not a read directory
        fx.write("reads.fastq", "@r\nA\n+\nI\n");
        let mut cfg = get_defaults();
        cfg.set(READ_PATH, "reads.fastq");
        assert!(look_for_basecalled_reads(cfg, &fx.ctx()).is_err());
    }

    #[test]
    fn read_path_resolved_against_cwd() {
        let fx = Fixture::new();
        let reads = fx.add_reads("run1", &["barcode01"]);
        let mut cfg = get_defaults();
        cfg.set(READ_PATH, "run1");
        let cfg = look_for_basecalled_reads(cfg, &fx.ctx()).unwrap();
        assert_eq!(cfg.read_path().unwrap(), Some(reads));
    }

    #[test]
    fn barcodes_csv_is_optional() {
        let fx = Fixture::new();
        let (cfg, samples) = look_for_barcodes_csv(get_defaults(), &fx.ctx()).unwrap();
        assert!(samples.is_none());
        assert_eq!(cfg, get_defaults());
    }

    #[test]
    fn barcodes_csv_parsed() {
        let fx = Fixture::new();
        let p = fx.write("barcodes.csv", "Sample, Barcode,notes\nmouse1, barcode01,x\nmouse2,barcode02,\n");
        let mut cfg = get_defaults();
        cfg.set(BARCODES_CSV, "barcodes.csv");
        let (cfg, samples) = look_for_barcodes_csv(cfg, &fx.ctx()).unwrap();
        assert_eq!(cfg.barcodes_csv().unwrap(), Some(p));
        let samples = samples.unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(
            samples[0],
            BarcodeSample {
                sample: "mouse1".to_string(),
                barcode: "barcode01".to_string()
            }
        );
    }

    #[test]
    fn bad_barcodes_csv() {
        let fx = Fixture::new();
        let mut cfg = get_defaults();
        cfg.set(BARCODES_CSV, "barcodes.csv");
        assert!(matches!(
            look_for_barcodes_csv(cfg.clone(), &fx.ctx()),
            Err(ResolveError::BarcodeCsv { .. })
        ));

        for bad in [
            "name,barcode\nm1,barcode01\n",
            "sample,barcode\n",
            "sample,barcode\nm1,barcode01\nm2,barcode01\n",
            "sample,barcode\nm1,\n",
            "sample,barcode\nm1,barcode01,extra\n",
        ] {
            fs::write(fx.cwd.join("barcodes.csv"), bad).unwrap();
            assert!(
                matches!(
                    look_for_barcodes_csv(cfg.clone(), &fx.ctx()),
                    Err(ResolveError::BarcodeCsv { .. })
                ),
                "{bad:?} accepted"
            );
        }
    }
}
