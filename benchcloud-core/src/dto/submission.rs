//! Run submission request

use crate::domain::run::{BenchmarkSettings, ToolVersion};
use crate::options::TranslatedOptions;

/// Everything the cloud master needs to execute one run
///
/// Built once per run right before submission and never changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSubmission {
    /// Identifier of the originating run, used for diagnostics only
    pub run_identifier: String,
    pub program_texts: Vec<String>,
    pub property_text: Option<String>,
    pub error_witness_text: Option<String>,
    pub settings: BenchmarkSettings,
    pub tool_version: Option<ToolVersion>,
    pub translated: TranslatedOptions,
}

impl RunSubmission {
    /// Flattens the submission into form parameters
    ///
    /// List values become repeated keys, in the order the service expects.
    pub fn form_params(&self) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = self
            .program_texts
            .iter()
            .map(|text| ("programText", text.clone()))
            .collect();

        if let Some(version) = &self.tool_version {
            params.push(("svnBranch", version.branch.clone()));
            params.push(("revision", version.revision.clone()));
        }
        if let Some(text) = &self.property_text {
            params.push(("propertyText", text.clone()));
        }
        if let Some(text) = &self.error_witness_text {
            params.push(("errorWitnessText", text.clone()));
        }

        let limits = &self.settings.limits;
        if let Some(memory) = limits.memory_mb {
            params.push(("memoryLimitation", format!("{}MB", memory)));
        }
        if let Some(time) = limits.time_secs {
            params.push(("timeLimitation", time.to_string()));
        }
        if let Some(cores) = limits.cores {
            params.push(("coreLimitation", cores.to_string()));
        }
        if let Some(cpu_model) = &self.settings.cpu_model {
            params.push(("cpuModel", cpu_model.clone()));
        }

        let translated = &self.translated;
        if let Some(specification) = &translated.specification {
            params.push(("specification", specification.clone()));
        }
        if let Some(configuration) = &translated.configuration {
            params.push(("configuration", configuration.clone()));
        }
        if let Some(heap) = &translated.heap {
            params.push(("heap", heap.clone()));
        }
        params.extend(translated.options.iter().map(|o| ("option", o.clone())));

        params
    }
}
