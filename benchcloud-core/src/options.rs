//! Translation of tool options into cloud master parameters
//!
//! The cloud master does not accept a raw command line. Each supported tool
//! option is looked up in a static table and applied to the parameter set;
//! options outside the table make the run unsubmittable.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::run::ResourceLimits;

/// Option always passed so the service reports statistics
const STATISTICS_OPTION: &str = "statistics.print=true";

/// Suffix of specification files that are error witnesses
const WITNESS_SUFFIX: &str = ".graphml";

/// What a tool option does to the parameter set
#[derive(Debug, Clone, Copy)]
enum Effect {
    /// Accepted but has no effect
    Ignore,
    /// Appends fixed configuration options
    Options(&'static [&'static str]),
    Heap,
    EntryFunction,
    TimeLimit,
    Specification,
    Configuration,
    SetProperty,
}

impl Effect {
    fn takes_argument(self) -> bool {
        !matches!(self, Effect::Ignore | Effect::Options(_))
    }
}

const OPTION_TABLE: &[(&str, Effect)] = &[
    ("-heap", Effect::Heap),
    ("-noout", Effect::Options(&["output.disable=true"])),
    ("-stats", Effect::Ignore),
    ("-java", Effect::Options(&["language=JAVA"])),
    ("-32", Effect::Options(&["analysis.machineModel=Linux32"])),
    ("-64", Effect::Options(&["analysis.machineModel=Linux64"])),
    ("-entryfunction", Effect::EntryFunction),
    ("-timelimit", Effect::TimeLimit),
    (
        "-skipRecursion",
        Effect::Options(&["cpa.callstack.skipRecursion=true", "analysis.summaryEdges=true"]),
    ),
    ("-spec", Effect::Specification),
    ("-config", Effect::Configuration),
    ("-setprop", Effect::SetProperty),
];

/// Errors making a run's option list unusable with the cloud master
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("option '{0}' is not usable with the cloud master")]
    Unsupported(String),

    #[error("option '{0}' requires an argument")]
    MissingArgument(String),

    #[error("configuration '{0}' is not from the default config directory")]
    ConfigOutsideDefaultDir(String),
}

/// Protocol parameters derived from a run's options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslatedOptions {
    /// Configuration options sent as repeated `option` parameters
    pub options: Vec<String>,
    pub heap: Option<String>,
    pub configuration: Option<String>,
    pub specification: Option<String>,
    /// Witness file whose content is sent as `errorWitnessText`
    pub error_witness_file: Option<PathBuf>,
}

/// Translates tool options and limits into protocol parameters
pub fn translate(options: &[String], limits: &ResourceLimits) -> Result<TranslatedOptions, OptionError> {
    let mut translated = TranslatedOptions {
        options: vec![STATISTICS_OPTION.to_string()],
        ..Default::default()
    };

    if let Some(soft_time) = limits.soft_time_secs {
        translated.options.push(format!("limits.time.cpu={}s", soft_time));
    }

    let mut args = options.iter();
    while let Some(option) = args.next() {
        let effect = OPTION_TABLE
            .iter()
            .find(|(name, _)| name == option)
            .map(|(_, effect)| *effect);

        let Some(effect) = effect else {
            match option.strip_prefix('-') {
                Some(name) if !name.is_empty() && translated.configuration.is_none() => {
                    translated.configuration = Some(name.to_string());
                    continue;
                }
                _ => return Err(OptionError::Unsupported(option.clone())),
            }
        };

        let argument = if effect.takes_argument() {
            let value = args
                .next()
                .ok_or_else(|| OptionError::MissingArgument(option.clone()))?;
            Some(value.as_str())
        } else {
            None
        };

        apply(effect, argument.unwrap_or_default(), &mut translated)?;
    }

    Ok(translated)
}

fn apply(effect: Effect, argument: &str, translated: &mut TranslatedOptions) -> Result<(), OptionError> {
    match effect {
        Effect::Ignore => {}
        Effect::Options(fixed) => translated
            .options
            .extend(fixed.iter().map(|o| o.to_string())),
        Effect::Heap => translated.heap = Some(argument.to_string()),
        Effect::EntryFunction => translated
            .options
            .push(format!("analysis.entryFunction={}", argument)),
        Effect::TimeLimit => translated.options.push(format!("limits.time.cpu={}", argument)),
        Effect::Specification => {
            if argument.ends_with(WITNESS_SUFFIX) {
                translated.error_witness_file = Some(PathBuf::from(argument));
            } else {
                translated.specification = Some(file_stem(argument));
            }
        }
        Effect::Configuration => {
            let tokens: Vec<&str> = argument.split('/').collect();
            if tokens.len() != 2 || tokens[0] != "config" {
                return Err(OptionError::ConfigOutsideDefaultDir(argument.to_string()));
            }
            translated.configuration = Some(file_stem(tokens[1]));
        }
        Effect::SetProperty => translated.options.push(argument.to_string()),
    }
    Ok(())
}

/// File name up to the first dot, e.g. `config/specification/sv-comp.spc` -> `sv-comp`
fn file_stem(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.split('.').next().unwrap_or(name).to_string()
}
