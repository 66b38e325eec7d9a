use foamnest::io::ext_repr::{ExtInstance, ExtSolution};
use serde::{Deserialize, Serialize};

use crate::config::GblConfig;

/// Contents of a solution file: the input instance, the nested layout and the configuration that produced it
#[derive(Serialize, Deserialize, Clone)]
pub struct GblOutput {
    #[serde(flatten)]
    pub instance: ExtInstance,
    pub solution: ExtSolution,
    pub config: GblConfig,
}
