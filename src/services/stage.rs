use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::errors::{AppError, AppResult};

/// Values flowing in or out of one stage, keyed by port name.
pub type PortValues = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port {
    pub name: &'static str,
    pub required: bool,
}

impl Port {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
        }
    }
}

/// One pipeline component with a fixed input/output contract.
///
/// `Input` and `Output` are structs whose field names match the declared ports.
#[async_trait]
pub trait Stage: Send + Sync {
    type Input: DeserializeOwned + Send;
    type Output: Serialize + Send;

    const INPUTS: &'static [Port];
    const OUTPUTS: &'static [&'static str];

    async fn run(&self, input: Self::Input) -> AppResult<Self::Output>;
}

/// Port-map view of a `Stage`, used by the pipeline to hold heterogeneous stages.
#[async_trait]
pub trait DynStage: Send + Sync {
    fn input_ports(&self) -> &'static [Port];
    fn output_ports(&self) -> &'static [&'static str];
    async fn run_ports(&self, inputs: PortValues) -> AppResult<PortValues>;
}

#[async_trait]
impl<S> DynStage for S
where
    S: Stage,
{
    fn input_ports(&self) -> &'static [Port] {
        S::INPUTS
    }

    fn output_ports(&self) -> &'static [&'static str] {
        S::OUTPUTS
    }

    async fn run_ports(&self, inputs: PortValues) -> AppResult<PortValues> {
        let input: S::Input = serde_json::from_value(Value::Object(inputs))?;
        let output = self.run(input).await?;

        match serde_json::to_value(output)? {
            Value::Object(map) => Ok(map),
            other => Err(AppError::Pipeline(format!(
                "stage output must serialize to named ports, got {}",
                other
            ))),
        }
    }
}
