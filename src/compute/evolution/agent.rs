//! Agent registry: named mutation and recombination operators.
//!
//! An agent declares how many input candidates it needs and turns them into a
//! new candidate. Inputs are handed over by value as independent clones of
//! population members, so an agent can mutate them freely without touching
//! stored state. When an agent finds nothing to improve it returns one of its
//! inputs unchanged; that candidate is still evaluated and inserted.

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;

use super::error::RegistryError;

/// Operator signature.
pub type AgentFn<C> = dyn Fn(Vec<C>, &mut StdRng) -> C + Send + Sync;

struct Agent<C> {
    name: String,
    arity: usize,
    func: Box<AgentFn<C>>,
}

/// Named operators with declared input arity.
pub struct AgentRegistry<C> {
    agents: Vec<Agent<C>>,
}

impl<C> Default for AgentRegistry<C> {
    fn default() -> Self {
        Self { agents: Vec::new() }
    }
}

impl<C> fmt::Debug for AgentRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.agents.iter().map(|a| (&a.name, a.arity)))
            .finish()
    }
}

impl<C> AgentRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent taking `arity` input candidates.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        arity: usize,
        func: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(Vec<C>, &mut StdRng) -> C + Send + Sync + 'static,
    {
        let name = name.into();
        if arity == 0 {
            return Err(RegistryError::InvalidArity { name });
        }
        if self.agents.iter().any(|a| a.name == name) {
            return Err(RegistryError::DuplicateName { kind: "Agent", name });
        }
        self.agents.push(Agent {
            name,
            arity,
            func: Box::new(func),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agent names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.agents.iter().map(|a| a.name.as_str())
    }

    /// Declared arity of an agent.
    pub fn arity(&self, name: &str) -> Option<usize> {
        self.find(name).map(|a| a.arity)
    }

    /// Pick an agent uniformly at random, returning its index.
    pub(crate) fn choose(&self, rng: &mut StdRng) -> Option<usize> {
        if self.agents.is_empty() {
            None
        } else {
            Some(rng.gen_range(0..self.agents.len()))
        }
    }

    /// Name and arity of the agent at `index`.
    pub(crate) fn describe(&self, index: usize) -> Option<(&str, usize)> {
        self.agents.get(index).map(|a| (a.name.as_str(), a.arity))
    }

    /// Run the named agent on `samples`.
    pub fn invoke(&self, name: &str, samples: Vec<C>, rng: &mut StdRng) -> Result<C, RegistryError> {
        let agent = self.find(name).ok_or_else(|| RegistryError::UnknownAgent {
            name: name.to_string(),
        })?;
        if samples.len() < agent.arity {
            return Err(RegistryError::InsufficientInput {
                agent: agent.name.clone(),
                required: agent.arity,
                provided: samples.len(),
            });
        }
        Ok((agent.func)(samples, rng))
    }

    fn find(&self, name: &str) -> Option<&Agent<C>> {
        self.agents.iter().find(|a| a.name == name)
    }
}
