use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::{
    config::*,
    context::RunContext,
    error::{ResolveError, Result},
    species,
};

/// Prefix used for the output directory when no output prefix is given
pub const DEFAULT_PREFIX: &str = "peaclock";

/// Working directory for the engine
#[derive(Debug)]
pub enum Workdir {
    /// Intermediate files are kept in the output directory (--no-temp)
    Output(PathBuf),
    /// User supplied temporary directory, left in place after the run
    Explicit(PathBuf),
    /// Fresh directory under the system temp location, removed on drop
    Scratch(TempDir),
}

impl Workdir {
    pub fn path(&self) -> &Path {
        match self {
            Self::Output(p) | Self::Explicit(p) => p,
            Self::Scratch(t) => t.path(),
        }
    }
}

fn create_dir(p: &Path, desc: &str) -> Result<()> {
    fs::create_dir_all(p)
        .map_err(|e| ResolveError::io(format!("Could not create {} {}", desc, p.display()), e))
}

/// Locate the bundled data for the requested species
pub fn get_package_data(mut cfg: Config, ctx: &RunContext) -> Result<Config> {
    let sp = species::find_species(&ctx.species_root(), cfg.species()?)?;
    info!("Species: {}", sp.name());
    cfg.set(SPECIES, sp.name());
    cfg.set_path(SPECIES_DATA, sp.dir());
    cfg.set_path(REFERENCE_FILE, sp.reference());
    Ok(cfg)
}

/// Add the min and max read lengths derived from the species reference
pub fn get_read_length_filter(mut cfg: Config) -> Result<Config> {
    let species = cfg.species()?.unwrap_or_default().to_owned();
    let reference = cfg
        .reference_file()?
        .ok_or_else(|| ResolveError::SpeciesData {
            species: species.clone(),
            reason: "no reference file".to_string(),
        })?;
    let (min, max) = species::read_length_filter(&species, &reference)?;
    debug!("Read length filter: {}-{}", min, max);
    cfg.set(MIN_LENGTH, min);
    cfg.set(MAX_LENGTH, max);
    Ok(cfg)
}

/// Output directory: explicit, or `<prefix>_<species>_<date>` in the working directory.
/// Created if it does not exist.
pub fn get_outdir(mut cfg: Config, ctx: &RunContext) -> Result<Config> {
    let prefix = cfg.output_prefix()?.unwrap_or(DEFAULT_PREFIX).to_owned();
    let outdir = match cfg.outdir()? {
        Some(d) => ctx.resolve(d),
        None => {
            let species = cfg.species()?.unwrap_or("unknown");
            ctx.cwd()
                .join(format!("{}_{}_{}", prefix, species, ctx.date_stamp()))
        }
    };
    create_dir(&outdir, "output directory")?;
    info!("Output directory: {}", outdir.display());
    cfg.set_path(OUTDIR, &outdir);
    cfg.set(OUTPUT_PREFIX, prefix);
    Ok(cfg)
}

/// Engine working directory.  Exactly one of: output directory (no_temp),
/// explicit tempdir, or a fresh scratch directory.
pub fn get_temp_dir(mut cfg: Config, ctx: &RunContext) -> Result<(Config, Workdir)> {
    let workdir = if cfg.no_temp()? {
        if let Some(t) = cfg.tempdir()? {
            warn!(
                "Ignoring temporary directory {} as no_temp is set",
                t.display()
            );
        }
        let outdir = cfg.outdir()?.ok_or_else(|| ResolveError::InvalidValue {
            key: OUTDIR.to_owned(),
            expected: "a resolved output directory",
        })?;
        Workdir::Output(outdir)
    } else if let Some(t) = cfg.tempdir()? {
        let t = ctx.resolve(t);
        create_dir(&t, "temporary directory")?;
        Workdir::Explicit(t)
    } else {
        let t = tempfile::Builder::new()
            .prefix("peaclock_")
            .tempdir()
            .map_err(|e| ResolveError::io("Could not create temporary directory", e))?;
        Workdir::Scratch(t)
    };
    debug!("Temporary directory: {}", workdir.path().display());
    cfg.set_path(TEMPDIR, workdir.path());
    Ok((cfg, workdir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::Fixture;

    fn with_species(fx: &Fixture, species: &str) -> Config {
        let mut cfg = get_defaults();
        cfg.set(SPECIES, species);
        get_package_data(cfg, &fx.ctx()).unwrap()
    }

    #[test]
    fn species_data_and_filter() {
        let fx = Fixture::new();
        let cfg = get_read_length_filter(with_species(&fx, "MOUSE")).unwrap();
        assert_eq!(cfg.species().unwrap(), Some("mouse"));
        assert_eq!(
            cfg.reference_file().unwrap(),
            Some(fx.package.join("data/mouse/reference.fasta"))
        );
        assert_eq!(cfg.min_length().unwrap(), Some(300));
        assert_eq!(cfg.max_length().unwrap(), Some(350 + species::MAX_LENGTH_SLACK));
    }

    #[test]
    fn derived_filter_beats_config_file() {
        let fx = Fixture::new();
        let mut cfg = with_species(&fx, "mouse");
        cfg.set(MIN_LENGTH, 10);
        let cfg = get_read_length_filter(cfg).unwrap();
        assert_eq!(cfg.min_length().unwrap(), Some(300));
    }

    #[test]
    fn default_outdir_has_species_and_date() {
        let fx = Fixture::new();
        let cfg = get_outdir(with_species(&fx, "mouse"), &fx.ctx()).unwrap();
        let expected = fx.cwd.join(format!("peaclock_mouse_{}", fx.ctx().date_stamp()));
        assert_eq!(cfg.outdir().unwrap(), Some(expected.clone()));
        assert!(expected.is_dir());
        assert_eq!(cfg.output_prefix().unwrap(), Some(DEFAULT_PREFIX));

        let mut cfg = with_species(&fx, "mouse");
        cfg.set(OUTPUT_PREFIX, "run7");
        let cfg = get_outdir(cfg, &fx.ctx()).unwrap();
        let dir = cfg.outdir().unwrap().unwrap();
        let name = dir.file_name().unwrap().to_str().unwrap();
        assert!(name.contains("mouse") && name.contains(&fx.ctx().date_stamp()));
        assert!(name.starts_with("run7_"));
    }

    #[test]
    fn explicit_outdir_is_relative_to_cwd() {
        let fx = Fixture::new();
        let mut cfg = with_species(&fx, "mouse");
        cfg.set(OUTDIR, "results/run1");
        let cfg = get_outdir(cfg, &fx.ctx()).unwrap();
        assert_eq!(cfg.outdir().unwrap(), Some(fx.cwd.join("results/run1")));
        assert!(fx.cwd.join("results/run1").is_dir());
    }

    #[test]
    fn no_temp_uses_outdir() {
        let fx = Fixture::new();
        let mut cfg = get_outdir(with_species(&fx, "mouse"), &fx.ctx()).unwrap();
        cfg.set(NO_TEMP, true);
        cfg.set(TEMPDIR, "tmp");
        let (cfg, wd) = get_temp_dir(cfg, &fx.ctx()).unwrap();
        assert!(matches!(wd, Workdir::Output(_)));
        assert_eq!(cfg.tempdir().unwrap(), cfg.outdir().unwrap());
        assert!(!fx.cwd.join("tmp").exists());
    }

    #[test]
    fn explicit_and_scratch_tempdir() {
        let fx = Fixture::new();
        let base = get_outdir(with_species(&fx, "mouse"), &fx.ctx()).unwrap();

        let mut cfg = base.clone();
        cfg.set(TEMPDIR, "tmp");
        let (cfg, wd) = get_temp_dir(cfg, &fx.ctx()).unwrap();
        assert!(matches!(wd, Workdir::Explicit(_)));
        assert_eq!(cfg.tempdir().unwrap(), Some(fx.cwd.join("tmp")));
        assert!(fx.cwd.join("tmp").is_dir());

        let (cfg, wd) = get_temp_dir(base, &fx.ctx()).unwrap();
        let p = wd.path().to_owned();
        assert!(matches!(wd, Workdir::Scratch(_)));
        assert_ne!(cfg.tempdir().unwrap(), cfg.outdir().unwrap());
        assert!(p.is_dir());
        drop(wd);
        assert!(!p.exists());
    }
}
