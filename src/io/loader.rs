//! The model loader (§4.7): reads `tasks.csv`, `architecture.csv`,
//! `budgets.csv`, and the optional `comm_links.csv` from a directory into a
//! [`SystemModel`], using `csv::Reader` with `serde`-derived row structs —
//! one struct per table, matching the corpus's `csv + serde` idiom for
//! tabular I/O.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::ModelError;
use crate::heuristics::assign_cores;
use crate::model::{
    Component, ComponentId, Core, CoreId, Scheduler, Seconds, SupplyInterface, SystemModel, Task, TaskId,
    TaskType,
};

#[derive(Debug, Deserialize)]
struct TaskRow {
    task_name: String,
    wcet: f64,
    period: f64,
    #[serde(default)]
    deadline: Option<f64>,
    component_id: String,
    #[serde(default)]
    priority: Option<u32>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoreRow {
    core_id: String,
    speed_factor: f64,
    scheduler: String,
}

#[derive(Debug, Deserialize)]
struct BudgetRow {
    component_id: String,
    scheduler: String,
    budget: f64,
    period: f64,
    #[serde(default)]
    core_id: Option<String>,
    #[serde(default)]
    parent_component: Option<String>,
    #[serde(default)]
    priority: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CommLinkRow {
    destination_task: String,
    delay: f64,
}

/// A parsed `budgets.csv` row, before the nesting tree is built and before
/// the supply interface has been validated.
struct ComponentSeed {
    id: ComponentId,
    scheduler: Scheduler,
    budget: Seconds,
    period: Seconds,
    core_id: Option<CoreId>,
    parent: Option<ComponentId>,
    priority: Option<u32>,
}

/// Read the three required tables (and the optional fourth) from `dir` and
/// build a [`SystemModel`]. `assign_cores_pass` mirrors the CLI's
/// `--assign-cores` flag (§4.9): when set, components whose `core_id` is
/// left blank in `budgets.csv` are resolved by the greedy heuristic before
/// the tree is built; when unset, a blank `core_id` is an input-shape error.
pub fn load_system_model(dir: &Path, assign_cores_pass: bool) -> Result<SystemModel, ModelError> {
    let architecture = open(&dir.join("architecture.csv"))?;
    let budgets = open(&dir.join("budgets.csv"))?;
    let tasks = open(&dir.join("tasks.csv"))?;

    let cores = load_cores(architecture)?;
    let mut seeds = load_budgets(budgets)?;
    resolve_core_assignments(&mut seeds, &cores, assign_cores_pass)?;

    let mut tasks_by_component = load_tasks(tasks, &seeds)?;
    let comm_links_path = dir.join("comm_links.csv");
    if comm_links_path.exists() {
        let comm_links = open(&comm_links_path)?;
        apply_comm_link_jitter(comm_links, &mut tasks_by_component)?;
    }

    build_model(cores, seeds, tasks_by_component)
}

fn open(path: &Path) -> Result<std::fs::File, ModelError> {
    std::fs::File::open(path).map_err(|source| ModelError::Io { path: path.display().to_string(), source })
}

fn load_cores<R: std::io::Read>(reader: R) -> Result<HashMap<CoreId, Core>, ModelError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut cores = HashMap::new();
    for record in reader.deserialize::<CoreRow>() {
        let row = record.map_err(|source| ModelError::Csv { table: "architecture.csv", source })?;
        let id = CoreId::from(row.core_id.as_str());
        if cores.contains_key(&id) {
            return Err(ModelError::DuplicateId { kind: "core", id: row.core_id });
        }
        let scheduler = Scheduler::parse(&row.scheduler).ok_or_else(|| ModelError::InvalidScheduler {
            context: format!("architecture.csv core '{}'", row.core_id),
            value: row.scheduler.clone(),
        })?;
        cores.insert(
            id.clone(),
            Core { id, scheduler, speed_factor: row.speed_factor, components: Vec::new() },
        );
    }
    Ok(cores)
}

fn load_budgets<R: std::io::Read>(reader: R) -> Result<Vec<ComponentSeed>, ModelError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut seeds = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for record in reader.deserialize::<BudgetRow>() {
        let row = record.map_err(|source| ModelError::Csv { table: "budgets.csv", source })?;
        if !seen.insert(row.component_id.clone()) {
            return Err(ModelError::DuplicateId { kind: "component", id: row.component_id });
        }
        let scheduler = Scheduler::parse(&row.scheduler).ok_or_else(|| ModelError::InvalidScheduler {
            context: format!("budgets.csv component '{}'", row.component_id),
            value: row.scheduler.clone(),
        })?;
        seeds.push(ComponentSeed {
            id: ComponentId::from(row.component_id.as_str()),
            scheduler,
            budget: Seconds(row.budget),
            period: Seconds(row.period),
            core_id: row.core_id.map(|c| CoreId::from(c.as_str())),
            parent: row.parent_component.map(|p| ComponentId::from(p.as_str())),
            priority: row.priority,
        });
    }
    Ok(seeds)
}

/// Resolve any component left without a `core_id`, either through the
/// greedy heuristic (§4.9) or by raising an input-shape error.
fn resolve_core_assignments(
    seeds: &mut [ComponentSeed],
    cores: &HashMap<CoreId, Core>,
    assign_cores_pass: bool,
) -> Result<(), ModelError> {
    let unresolved: Vec<usize> = seeds
        .iter()
        .enumerate()
        .filter(|(_, s)| s.parent.is_none() && s.core_id.is_none())
        .map(|(i, _)| i)
        .collect();
    if unresolved.is_empty() {
        return Ok(());
    }
    if !assign_cores_pass {
        let first = &seeds[unresolved[0]];
        return Err(ModelError::UnknownReference {
            table: "budgets.csv",
            kind: "core",
            id: format!("<unresolved for component {}>", first.id),
        });
    }

    let speeds: HashMap<CoreId, f64> = cores.iter().map(|(id, c)| (id.clone(), c.speed_factor)).collect();
    let demands: Vec<(ComponentId, f64)> = unresolved
        .iter()
        .map(|&i| (seeds[i].id.clone(), seeds[i].budget / seeds[i].period))
        .collect();
    let assignment = assign_cores(&demands, &speeds);
    for i in unresolved {
        let assigned = assignment.get(&seeds[i].id).cloned();
        seeds[i].core_id = assigned;
    }
    Ok(())
}

fn load_tasks<R: std::io::Read>(
    reader: R,
    seeds: &[ComponentSeed],
) -> Result<HashMap<ComponentId, Vec<Task>>, ModelError> {
    let known: std::collections::HashSet<&ComponentId> = seeds.iter().map(|s| &s.id).collect();
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut by_component: HashMap<ComponentId, Vec<Task>> = HashMap::new();
    let mut seen_ids = std::collections::HashSet::new();

    for record in reader.deserialize::<TaskRow>() {
        let row = record.map_err(|source| ModelError::Csv { table: "tasks.csv", source })?;
        if !seen_ids.insert(row.task_name.clone()) {
            return Err(ModelError::DuplicateId { kind: "task", id: row.task_name });
        }
        let component_id = ComponentId::from(row.component_id.as_str());
        if !known.contains(&component_id) {
            return Err(ModelError::UnknownReference {
                table: "tasks.csv",
                kind: "component",
                id: row.component_id,
            });
        }

        let period = Seconds(row.period);
        let deadline = row.deadline.map(Seconds).unwrap_or(period);
        let kind = match row.kind.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("soft") => TaskType::Soft,
            _ => TaskType::Hard,
        };
        let task = Task {
            id: TaskId::from(row.task_name.as_str()),
            wcet: Seconds(row.wcet),
            period,
            deadline,
            priority: row.priority,
            kind,
            jitter: Seconds::ZERO,
        };
        if let Err(e) = task.validate() {
            warn!("dropping task '{}': {e}", task.id);
            continue;
        }
        by_component.entry(component_id).or_default().push(task);
    }
    Ok(by_component)
}

/// Fold in `comm_links.csv`, if present (§4.7 step 4): maximum delay per
/// destination task wins when duplicates appear.
fn apply_comm_link_jitter<R: std::io::Read>(
    reader: R,
    tasks_by_component: &mut HashMap<ComponentId, Vec<Task>>,
) -> Result<(), ModelError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut jitter: HashMap<String, f64> = HashMap::new();
    for record in reader.deserialize::<CommLinkRow>() {
        let row = record.map_err(|source| ModelError::Csv { table: "comm_links.csv", source })?;
        let entry = jitter.entry(row.destination_task).or_insert(0.0);
        *entry = entry.max(row.delay);
    }
    for tasks in tasks_by_component.values_mut() {
        for task in tasks.iter_mut() {
            if let Some(&delay) = jitter.get(task.id.as_str()) {
                task.jitter = Seconds(delay);
            }
        }
    }
    Ok(())
}

/// Build the nesting tree from the flat seed list, attach tasks, assign
/// missing FPS/RM priorities, and drop any component whose supply
/// interface is out of its domain range (§7 kind 2: fatal to that
/// component, not to the whole load).
fn build_model(
    mut cores: HashMap<CoreId, Core>,
    seeds: Vec<ComponentSeed>,
    mut tasks_by_component: HashMap<ComponentId, Vec<Task>>,
) -> Result<SystemModel, ModelError> {
    let by_id: HashMap<ComponentId, usize> =
        seeds.iter().enumerate().map(|(i, s)| (s.id.clone(), i)).collect();
    let mut children: HashMap<ComponentId, Vec<usize>> = HashMap::new();
    for (i, seed) in seeds.iter().enumerate() {
        if let Some(parent) = &seed.parent {
            if !by_id.contains_key(parent) {
                return Err(ModelError::UnknownReference {
                    table: "budgets.csv",
                    kind: "component",
                    id: parent.to_string(),
                });
            }
            children.entry(parent.clone()).or_default().push(i);
        }
    }

    fn build_component(
        i: usize,
        seeds: &[ComponentSeed],
        children: &HashMap<ComponentId, Vec<usize>>,
        tasks_by_component: &mut HashMap<ComponentId, Vec<Task>>,
    ) -> Option<Component> {
        let seed = &seeds[i];
        let interface = match SupplyInterface::from_prm(seed.budget, seed.period, seed.id.as_str()) {
            Ok(interface) => interface,
            Err(e) => {
                warn!("dropping component '{}': {e}", seed.id);
                return None;
            }
        };
        let tasks = tasks_by_component.remove(&seed.id).unwrap_or_default();
        let subcomponents = children
            .get(&seed.id)
            .into_iter()
            .flatten()
            .filter_map(|&child_i| build_component(child_i, seeds, children, tasks_by_component))
            .collect();
        Some(Component {
            id: seed.id.clone(),
            scheduler: seed.scheduler,
            tasks,
            subcomponents,
            interface,
            priority: seed.priority,
        })
    }

    for (i, seed) in seeds.iter().enumerate() {
        if seed.parent.is_some() {
            continue;
        }
        let core_id = seed.core_id.as_ref().ok_or_else(|| ModelError::UnknownReference {
            table: "budgets.csv",
            kind: "core",
            id: format!("<unresolved for component {}>", seed.id),
        })?;
        let core = cores.get_mut(core_id).ok_or_else(|| ModelError::UnknownReference {
            table: "budgets.csv",
            kind: "core",
            id: core_id.to_string(),
        })?;
        if let Some(mut component) = build_component(i, &seeds, &children, &mut tasks_by_component) {
            component.assign_missing_priorities();
            core.components.push(component);
        }
    }

    Ok(SystemModel::new(cores.into_values().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn load(architecture: &str, budgets: &str, tasks: &str) -> SystemModel {
        let cores = load_cores(Cursor::new(architecture)).unwrap();
        let mut seeds = load_budgets(Cursor::new(budgets)).unwrap();
        resolve_core_assignments(&mut seeds, &cores, false).unwrap();
        let tasks_by_component = load_tasks(Cursor::new(tasks), &seeds).unwrap();
        build_model(cores, seeds, tasks_by_component).unwrap()
    }

    #[test]
    fn loads_a_single_component_single_core_model() {
        let model = load(
            "core_id,speed_factor,scheduler\nc1,1.0,EDF\n",
            "component_id,scheduler,budget,period,core_id\ns1,EDF,2.0,4.0,c1\n",
            "task_name,wcet,period,deadline,component_id,priority,type\nt1,1.0,4.0,4.0,s1,,hard\n",
        );
        assert_eq!(model.cores.len(), 1);
        assert_eq!(model.cores[0].components.len(), 1);
        assert_eq!(model.cores[0].components[0].tasks.len(), 1);
    }

    #[test]
    fn missing_deadline_column_defaults_to_period() {
        let model = load(
            "core_id,speed_factor,scheduler\nc1,1.0,EDF\n",
            "component_id,scheduler,budget,period,core_id\ns1,EDF,2.0,4.0,c1\n",
            "task_name,wcet,period,component_id\nt1,1.0,4.0,s1\n",
        );
        let task = &model.cores[0].components[0].tasks[0];
        assert_eq!(task.deadline.0, task.period.0);
    }

    #[test]
    fn unknown_component_reference_is_rejected() {
        let cores = load_cores(Cursor::new("core_id,speed_factor,scheduler\nc1,1.0,EDF\n")).unwrap();
        let seeds = load_budgets(Cursor::new(
            "component_id,scheduler,budget,period,core_id\ns1,EDF,2.0,4.0,c1\n",
        ))
        .unwrap();
        let result = load_tasks(
            Cursor::new("task_name,wcet,period,component_id\nt1,1.0,4.0,does_not_exist\n"),
            &seeds,
        );
        assert!(result.is_err());
    }

    #[test]
    fn nested_subcomponent_is_attached_to_its_parent() {
        let cores = load_cores(Cursor::new("core_id,speed_factor,scheduler\nc1,1.0,EDF\n")).unwrap();
        let mut seeds = load_budgets(Cursor::new(
            "component_id,scheduler,budget,period,core_id,parent_component\n\
             parent,EDF,3.0,5.0,c1,\n\
             child,EDF,1.0,5.0,,parent\n",
        ))
        .unwrap();
        resolve_core_assignments(&mut seeds, &cores, false).unwrap();
        let tasks_by_component = load_tasks(Cursor::new("task_name,wcet,period,component_id\n"), &seeds).unwrap();
        let model = build_model(cores, seeds, tasks_by_component).unwrap();
        assert_eq!(model.cores[0].components[0].subcomponents.len(), 1);
    }

    #[test]
    fn comm_link_jitter_picks_the_maximum_delay_per_task() {
        let mut tasks_by_component = HashMap::new();
        tasks_by_component.insert(
            ComponentId::from("s1"),
            vec![Task {
                id: TaskId::from("t1"),
                wcet: Seconds(1.0),
                period: Seconds(4.0),
                deadline: Seconds(4.0),
                priority: None,
                kind: TaskType::Hard,
                jitter: Seconds::ZERO,
            }],
        );
        apply_comm_link_jitter(
            Cursor::new("destination_task,delay\nt1,0.5\nt1,0.9\n"),
            &mut tasks_by_component,
        )
        .unwrap();
        assert_eq!(tasks_by_component[&ComponentId::from("s1")][0].jitter.0, 0.9);
    }
}
