use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    services::stage::{DynStage, PortValues, Stage},
};

/// `stage.port` address of one end of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub stage: String,
    pub port: String,
}

impl FromStr for PortRef {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((stage, port)) if !stage.is_empty() && !port.is_empty() => Ok(PortRef {
                stage: stage.to_string(),
                port: port.to_string(),
            }),
            _ => Err(AppError::Pipeline(format!(
                "'{}' is not a 'stage.port' reference",
                s
            ))),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.stage, self.port)
    }
}

/// Directed edge carrying one stage output into another stage's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub from: PortRef,
    pub to: PortRef,
}

struct RegisteredStage {
    name: String,
    stage: Box<dyn DynStage>,
}

/// Values supplied directly to stage inputs at invocation time, outside the edge graph.
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    values: HashMap<String, PortValues>,
}

impl PipelineInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Serialize>(&mut self, stage: &str, port: &str, value: &T) -> AppResult<()> {
        self.values
            .entry(stage.to_string())
            .or_default()
            .insert(port.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn with<T: Serialize>(mut self, stage: &str, port: &str, value: &T) -> AppResult<Self> {
        self.insert(stage, port, value)?;
        Ok(self)
    }
}

/// Every stage's outputs from one run, keyed by stage name.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutputs {
    values: HashMap<String, PortValues>,
}

impl PipelineOutputs {
    pub fn get<T: DeserializeOwned>(&self, stage: &str, port: &str) -> AppResult<T> {
        let value = self
            .values
            .get(stage)
            .and_then(|ports| ports.get(port))
            .cloned()
            .ok_or_else(|| AppError::Pipeline(format!("no output at {}.{}", stage, port)))?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn stage(&self, stage: &str) -> Option<&PortValues> {
        self.values.get(stage)
    }
}

/// Fixed stage graph executed sequentially in dependency order.
///
/// Wiring is validated as it is declared, so a constructed pipeline is always acyclic and every
/// connection names declared ports. The graph is read-only once built and can be shared across
/// concurrent runs.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<RegisteredStage>,
    connections: Vec<Connection>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stage<S>(mut self, name: &str, stage: S) -> AppResult<Self>
    where
        S: Stage + 'static,
    {
        if name.is_empty() || name.contains('.') {
            return Err(AppError::Pipeline(format!("invalid stage name '{}'", name)));
        }
        if self.index_of(name).is_some() {
            return Err(AppError::Pipeline(format!(
                "stage '{}' is already registered",
                name
            )));
        }

        self.stages.push(RegisteredStage {
            name: name.to_string(),
            stage: Box::new(stage),
        });
        Ok(self)
    }

    pub fn connect(mut self, from: &str, to: &str) -> AppResult<Self> {
        let from: PortRef = from.parse()?;
        let to: PortRef = to.parse()?;

        let source = self.registered(&from.stage)?;
        if !source.stage.output_ports().contains(&from.port.as_str()) {
            return Err(AppError::Pipeline(format!(
                "stage '{}' has no output '{}'",
                from.stage, from.port
            )));
        }

        let target = self.registered(&to.stage)?;
        if !target
            .stage
            .input_ports()
            .iter()
            .any(|p| p.name == to.port)
        {
            return Err(AppError::Pipeline(format!(
                "stage '{}' has no input '{}'",
                to.stage, to.port
            )));
        }

        if self.connections.iter().any(|c| c.to == to) {
            return Err(AppError::Pipeline(format!("input {} is already connected", to)));
        }

        self.connections.push(Connection { from, to });
        if let Err(err) = self.execution_order() {
            self.connections.pop();
            return Err(err);
        }
        Ok(self)
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Stage names in the order `run` executes them.
    pub fn topological_order(&self) -> AppResult<Vec<&str>> {
        Ok(self
            .execution_order()?
            .into_iter()
            .map(|idx| self.stages[idx].name.as_str())
            .collect())
    }

    pub async fn run(&self, inputs: PipelineInputs) -> AppResult<PipelineOutputs> {
        let run_id = Uuid::new_v4();
        let order = self.execution_order()?;
        self.check_injected_inputs(&inputs)?;

        log::info!(
            "Pipeline run {} started with {} stage(s)",
            run_id,
            order.len()
        );

        let mut injected = inputs.values;
        let mut outputs = PipelineOutputs::default();

        for idx in order {
            let registered = &self.stages[idx];
            let mut stage_inputs = injected.remove(&registered.name).unwrap_or_default();

            for connection in self
                .connections
                .iter()
                .filter(|c| c.to.stage == registered.name)
            {
                let value = outputs
                    .values
                    .get(&connection.from.stage)
                    .and_then(|ports| ports.get(&connection.from.port))
                    .cloned()
                    .ok_or_else(|| {
                        AppError::Pipeline(format!(
                            "{} produced no value for {}",
                            connection.from, connection.to
                        ))
                    })?;
                stage_inputs.insert(connection.to.port.clone(), value);
            }

            log::debug!("Run {}: executing stage '{}'", run_id, registered.name);
            let produced = registered
                .stage
                .run_ports(stage_inputs)
                .await
                .map_err(|e| {
                    log::error!(
                        "Run {}: stage '{}' failed: {}",
                        run_id,
                        registered.name,
                        e
                    );
                    e
                })?;

            for port in registered.stage.output_ports() {
                if !produced.contains_key(*port) {
                    return Err(AppError::Pipeline(format!(
                        "stage '{}' did not produce output '{}'",
                        registered.name, port
                    )));
                }
            }

            log::debug!("Run {}: stage '{}' finished", run_id, registered.name);
            outputs.values.insert(registered.name.clone(), produced);
        }

        log::info!("Pipeline run {} completed", run_id);
        Ok(outputs)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.name == name)
    }

    fn registered(&self, name: &str) -> AppResult<&RegisteredStage> {
        self.index_of(name)
            .map(|idx| &self.stages[idx])
            .ok_or_else(|| AppError::Pipeline(format!("unknown stage '{}'", name)))
    }

    fn check_injected_inputs(&self, inputs: &PipelineInputs) -> AppResult<()> {
        for (stage, ports) in &inputs.values {
            let registered = self.registered(stage)?;
            for port in ports.keys() {
                if !registered
                    .stage
                    .input_ports()
                    .iter()
                    .any(|p| p.name == port.as_str())
                {
                    return Err(AppError::Pipeline(format!(
                        "stage '{}' has no input '{}'",
                        stage, port
                    )));
                }
                if self
                    .connections
                    .iter()
                    .any(|c| c.to.stage == *stage && c.to.port == *port)
                {
                    return Err(AppError::Pipeline(format!(
                        "input {}.{} is connected and cannot also be supplied",
                        stage, port
                    )));
                }
            }
        }

        for registered in &self.stages {
            for port in registered.stage.input_ports().iter().filter(|p| p.required) {
                let supplied = inputs
                    .values
                    .get(&registered.name)
                    .is_some_and(|ports| ports.contains_key(port.name));
                let connected = self
                    .connections
                    .iter()
                    .any(|c| c.to.stage == registered.name && c.to.port == port.name);
                if !supplied && !connected {
                    return Err(AppError::Pipeline(format!(
                        "stage '{}' is missing required input '{}'",
                        registered.name, port.name
                    )));
                }
            }
        }
        Ok(())
    }

    // Kahn's algorithm; ties go to the earliest registered stage.
    fn execution_order(&self) -> AppResult<Vec<usize>> {
        let mut in_degree = vec![0usize; self.stages.len()];
        let mut edges: Vec<(usize, usize)> = Vec::with_capacity(self.connections.len());
        for connection in &self.connections {
            let from = self.registered_index(&connection.from.stage)?;
            let to = self.registered_index(&connection.to.stage)?;
            in_degree[to] += 1;
            edges.push((from, to));
        }

        let mut done = vec![false; self.stages.len()];
        let mut order = Vec::with_capacity(self.stages.len());
        while order.len() < self.stages.len() {
            let next = (0..self.stages.len())
                .find(|&idx| !done[idx] && in_degree[idx] == 0)
                .ok_or_else(|| {
                    AppError::Pipeline("stage connections contain a cycle".to_string())
                })?;

            done[next] = true;
            order.push(next);
            for &(_, to) in edges.iter().filter(|edge| edge.0 == next) {
                in_degree[to] -= 1;
            }
        }

        Ok(order)
    }

    fn registered_index(&self, name: &str) -> AppResult<usize> {
        self.index_of(name)
            .ok_or_else(|| AppError::Pipeline(format!("unknown stage '{}'", name)))
    }
}
