//! Reconstruction context and stage-graph description

use std::sync::Arc;

use recon_config::{Paths, StreamConfig};
use recon_protocol::AcquisitionHeader;

/// Everything a reconstruction stage needs about its environment
#[derive(Debug, Clone)]
pub struct Context {
    pub header: Arc<AcquisitionHeader>,
    pub paths: Paths,
}

impl Context {
    pub fn new(header: Arc<AcquisitionHeader>, paths: Paths) -> Self {
        Self { header, paths }
    }
}

/// One stage of the resolved processing stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    pub classname: String,
    pub properties: Vec<(String, String)>,
}

/// The resolved processing-stream description
///
/// Stage execution is owned by the reconstruction engine; the
/// connection only assembles the description and hands it over.
#[derive(Debug, Clone)]
pub struct ReconStream {
    context: Context,
    stages: Vec<Stage>,
}

impl ReconStream {
    /// Assemble the stream description from its configuration
    pub fn from_config(config: &StreamConfig, context: Context) -> Self {
        let stages = config
            .gadgets
            .iter()
            .map(|gadget| Stage {
                name: gadget.name.clone(),
                classname: gadget.classname.clone(),
                properties: gadget.properties.clone(),
            })
            .collect();

        Self { context, stages }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}
