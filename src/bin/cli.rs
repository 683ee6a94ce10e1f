use chrono::NaiveDate;
use cpm_engine::persistence::{format_predecessor_list, parse_predecessor_list};
use cpm_engine::{
    CpmResult, PredecessorLink, ProjectPlan, RelationshipType, ScheduleEngine, TaskDescriptor,
    calculate_batch, export_result_to_csv, load_plan_from_json, load_tasks_from_csv, logging,
    save_plan_to_json, save_tasks_to_csv,
};
use polars::prelude::*;
use std::io::{self, Write};

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Boolean(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let rows: Vec<Vec<String>> = (0..df.height())
        .map(|row_idx| {
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[String]| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            line.push_str(&format!(" {:<width$} |", cell, width = widths[ci]));
        }
        line
    };

    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(sep.clone());
    out.push(render_row(col_names.as_slice()));
    out.push(sep.clone());
    for row in &rows {
        out.push(render_row(row.as_slice()));
    }
    out.push(sep);
    out.join("\n")
}

fn plan_dataframe(plan: &ProjectPlan) -> PolarsResult<DataFrame> {
    let ids: Vec<&str> = plan.tasks.iter().map(|t| t.id.as_str()).collect();
    let names: Vec<&str> = plan.tasks.iter().map(|t| t.name.as_str()).collect();
    let wbs: Vec<&str> = plan.tasks.iter().map(|t| t.wbs_code.as_str()).collect();
    let durations: Vec<u32> = plan.tasks.iter().map(|t| t.duration_days).collect();
    let preds: Vec<String> = plan
        .tasks
        .iter()
        .map(|t| format_predecessor_list(&t.predecessors))
        .collect();
    let preds: Vec<&str> = preds.iter().map(String::as_str).collect();
    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("name"), names).into_column(),
        Series::new(PlSmallStr::from_static("wbs_code"), wbs).into_column(),
        Series::new(PlSmallStr::from_static("duration_days"), durations).into_column(),
        Series::new(PlSmallStr::from_static("predecessors"), preds).into_column(),
    ])
}

fn print_plan(plan: &ProjectPlan) {
    match plan_dataframe(plan) {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Render error: {}", e),
    }
}

fn print_result(result: &CpmResult) {
    match result.to_dataframe() {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Render error: {}", e),
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show current tasks\n  add <id> <name> <duration_days> [preds]\n                                     Upsert a task (preds like A;B:SS+2;C:FF-1)\n  link <id> <pred_id> [FS|SS|FF|SF] [lag]\n                                     Add a predecessor link\n  unlink <id> <pred_id>              Remove links from pred_id to id\n  delete <id>                        Delete a task and links pointing at it\n  compute                            Calculate the schedule\n  critical                           List critical path task ids\n  dangling                           List dangling task ids\n  coverage                           Show dependency coverage\n  meta show                          Show project metadata\n  meta name <text...>                Update project name\n  meta manager <text...>             Update project manager\n  meta start <YYYY-MM-DD>            Update project start date\n  save <json|csv> <path>             Persist tasks to disk\n  load <json|csv> <path>             Load tasks from disk\n  export <path>                      Write calculated schedule to CSV\n  batch <json_path>...               Calculate several plan files in parallel\n  quit|exit                          Exit"
    );
}

fn print_metadata(plan: &ProjectPlan) {
    let metadata = &plan.metadata;
    println!("Project name       : {}", metadata.project_name);
    println!("Project description: {}", metadata.project_description);
    println!("Manager            : {}", metadata.manager);
    match metadata.project_start_date {
        Some(date) => println!("Project start date : {}", date),
        None => println!("Project start date : (not set)"),
    }
}

fn compute(plan: &ProjectPlan) -> Option<CpmResult> {
    let engine = match ScheduleEngine::with_tasks(&plan.tasks) {
        Ok(engine) => engine,
        Err(e) => {
            println!("Error: {}", e);
            return None;
        }
    };
    match engine.try_calculate() {
        Ok(result) => Some(result),
        Err(cycle) => {
            println!("Error: {}", cycle);
            Some(CpmResult::empty())
        }
    }
}

fn rest_of_line<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

fn handle_add<'a>(plan: &mut ProjectPlan, mut parts: impl Iterator<Item = &'a str>) {
    let (Some(id), Some(name), Some(dur_s)) = (parts.next(), parts.next(), parts.next()) else {
        println!("Usage: add <id> <name> <duration_days> [preds]");
        return;
    };
    let duration_days: u32 = match dur_s.parse() {
        Ok(v) => v,
        Err(_) => {
            println!("Invalid duration_days");
            return;
        }
    };
    let predecessors = match parts.next().map(parse_predecessor_list).transpose() {
        Ok(links) => links.unwrap_or_default(),
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };
    let mut task = TaskDescriptor::new(id)
        .with_name(name)
        .with_duration(duration_days);
    task.predecessors = predecessors;
    match plan.upsert_task(task) {
        Ok(()) => {
            println!("Task upserted.");
            print_plan(plan);
        }
        Err(e) => println!("Error: {}", e),
    }
}

fn handle_link<'a>(plan: &mut ProjectPlan, mut parts: impl Iterator<Item = &'a str>) {
    let (Some(id), Some(pred_id)) = (parts.next(), parts.next()) else {
        println!("Usage: link <id> <pred_id> [FS|SS|FF|SF] [lag]");
        return;
    };
    let relationship = match parts.next().map(str::parse::<RelationshipType>).transpose() {
        Ok(rel) => rel.unwrap_or_default(),
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };
    let lag_days: i64 = match parts.next().map(str::parse::<i64>).transpose() {
        Ok(lag) => lag.unwrap_or(0),
        Err(_) => {
            println!("Invalid lag");
            return;
        }
    };
    match plan.find_task_mut(id) {
        Some(task) => {
            task.predecessors
                .push(PredecessorLink::new(pred_id, relationship, lag_days));
            println!("Linked {pred_id} -> {id} ({relationship}, lag {lag_days}).");
        }
        None => println!("Task {id} not found."),
    }
}

fn handle_unlink<'a>(plan: &mut ProjectPlan, mut parts: impl Iterator<Item = &'a str>) {
    let (Some(id), Some(pred_id)) = (parts.next(), parts.next()) else {
        println!("Usage: unlink <id> <pred_id>");
        return;
    };
    match plan.find_task_mut(id) {
        Some(task) => {
            let before = task.predecessors.len();
            task.predecessors.retain(|link| link.predecessor_id != pred_id);
            let removed = before - task.predecessors.len();
            println!("Removed {removed} link(s) from {pred_id} to {id}.");
        }
        None => println!("Task {id} not found."),
    }
}

fn handle_meta<'a>(plan: &mut ProjectPlan, mut parts: impl Iterator<Item = &'a str>) {
    match parts.next() {
        Some("show") | None => print_metadata(plan),
        Some("name") => {
            plan.metadata.project_name = rest_of_line(parts);
            println!("Project name updated.");
        }
        Some("manager") => {
            plan.metadata.manager = rest_of_line(parts);
            println!("Project manager updated.");
        }
        Some("start") => match parts.next().map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d")) {
            Some(Ok(date)) => {
                plan.metadata.project_start_date = Some(date);
                println!("Project start date set to {date}.");
            }
            Some(Err(_)) => println!("Invalid date (YYYY-MM-DD)"),
            None => println!("Usage: meta start <YYYY-MM-DD>"),
        },
        Some(other) => println!("Unknown meta subcommand '{other}'"),
    }
}

fn handle_save<'a>(plan: &ProjectPlan, mut parts: impl Iterator<Item = &'a str>) {
    let (Some(format), Some(path)) = (parts.next(), parts.next()) else {
        println!("Usage: save <json|csv> <path>");
        return;
    };
    let res = match format {
        "json" => save_plan_to_json(plan, path),
        "csv" => save_tasks_to_csv(&plan.tasks, path),
        _ => {
            println!("Unknown format '{format}' (expected json or csv)");
            return;
        }
    };
    match res {
        Ok(()) => println!("Plan saved to {path}."),
        Err(e) => println!("Save error: {}", e),
    }
}

fn handle_load<'a>(plan: &mut ProjectPlan, mut parts: impl Iterator<Item = &'a str>) {
    let (Some(format), Some(path)) = (parts.next(), parts.next()) else {
        println!("Usage: load <json|csv> <path>");
        return;
    };
    let loaded = match format {
        "json" => load_plan_from_json(path),
        "csv" => load_tasks_from_csv(path)
            .map(|tasks| ProjectPlan::with_tasks(plan.metadata.clone(), tasks)),
        _ => {
            println!("Unknown format '{format}' (expected json or csv)");
            return;
        }
    };
    match loaded {
        Ok(new_plan) => {
            *plan = new_plan;
            println!("Plan loaded from {path}.");
            print_plan(plan);
        }
        Err(e) => println!("Load error: {}", e),
    }
}

fn handle_batch<'a>(parts: impl Iterator<Item = &'a str>) {
    let paths: Vec<&str> = parts.collect();
    if paths.is_empty() {
        println!("Usage: batch <json_path>...");
        return;
    }
    let mut task_sets = Vec::with_capacity(paths.len());
    for path in &paths {
        match load_plan_from_json(path) {
            Ok(plan) => task_sets.push(plan.tasks),
            Err(e) => {
                println!("Load error for {path}: {}", e);
                return;
            }
        }
    }
    for (path, result) in paths.iter().zip(calculate_batch(&task_sets)) {
        match result {
            Ok(result) => println!("{path}: {}", result.to_cli_summary()),
            Err(e) => println!("{path}: error: {}", e),
        }
    }
}

fn main() {
    logging::init_logging("info");

    let mut plan = ProjectPlan::default();

    println!("CPM Engine (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_plan(&plan),
            "add" => handle_add(&mut plan, parts),
            "link" => handle_link(&mut plan, parts),
            "unlink" => handle_unlink(&mut plan, parts),
            "delete" => match parts.next() {
                Some(id) => {
                    if plan.remove_task(id) {
                        println!("Deleted task {id}.");
                        print_plan(&plan);
                    } else {
                        println!("Task {id} not found.");
                    }
                }
                None => println!("Usage: delete <id>"),
            },
            "compute" => {
                if let Some(result) = compute(&plan) {
                    println!("Computed ({})", result.to_cli_summary());
                    print_result(&result);
                }
            }
            "critical" => {
                if let Some(result) = compute(&plan) {
                    println!("Critical path: {}", result.critical_path.join(" -> "));
                }
            }
            "dangling" => {
                if let Some(result) = compute(&plan) {
                    if result.stats.dangling_tasks.is_empty() {
                        println!("No dangling tasks.");
                    } else {
                        println!("Dangling tasks: {}", result.stats.dangling_tasks.join(", "));
                    }
                }
            }
            "coverage" => match plan.engine() {
                Ok(engine) => {
                    let coverage = engine.coverage();
                    println!(
                        "Links: {} declared, {} resolved, {} unresolved",
                        coverage.total_predecessor_links,
                        coverage.resolved_links,
                        coverage.unresolved_links
                    );
                    println!(
                        "Tasks: {} linked, {} isolated ({:.2}% coverage)",
                        coverage.linked_tasks, coverage.isolated_tasks, coverage.coverage_percent
                    );
                }
                Err(e) => println!("Error: {}", e),
            },
            "meta" => handle_meta(&mut plan, parts),
            "save" => handle_save(&plan, parts),
            "load" => handle_load(&mut plan, parts),
            "export" => match parts.next() {
                Some(path) => {
                    if let Some(result) = compute(&plan) {
                        match export_result_to_csv(&result, &plan.metadata, path) {
                            Ok(()) => println!("Schedule exported to {path}."),
                            Err(e) => println!("Export error: {}", e),
                        }
                    }
                }
                None => println!("Usage: export <path>"),
            },
            "batch" => handle_batch(parts),
            _ => println!("Unknown command '{cmd}'. Type 'help'."),
        }
    }
}
