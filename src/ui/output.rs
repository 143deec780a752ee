use crate::model::{Service, ServiceCategory};
use crate::output::is_quiet;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(icon: &str, text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", icon, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn empty(label: &str) {
    println!("{} {}", Icons::EMPTY, label.style(theme().dim.clone()));
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

pub fn service_detail(service: &Service) {
    println!(
        "{} {} {}",
        Icons::WRENCH,
        service.name.style(theme().header.clone()),
        format!("#{}", service.id).style(theme().dim.clone())
    );
    summary_row("Price:", &format!("{}", service.price.style(theme().price.clone())));
    summary_row("Duration:", &format!("{} min", service.duration_minutes));
    summary_row(
        "Category:",
        &format!("{} ({}, {})", service.category.name, service.category.icon, service.category.color),
    );
    summary_row(
        "Status:",
        &format!("{}", service.status.style(theme().status(service.status))),
    );
    if let Some(description) = &service.description {
        summary_row("Description:", description);
    }
    summary_row("Created:", &service.created_at.to_rfc3339());
    summary_row("Updated:", &service.updated_at.to_rfc3339());
}

pub fn category_detail(category: &ServiceCategory, active_services: usize) {
    println!(
        "{} {} {}",
        Icons::TAG,
        category.name.style(theme().header.clone()),
        format!("#{}", category.id).style(theme().dim.clone())
    );
    summary_row("Color:", &category.color);
    summary_row("Icon:", &category.icon);
    summary_row(
        "Status:",
        &format!("{}", category.status.style(theme().status(category.status))),
    );
    summary_row("Active services:", &active_services.to_string());
    if let Some(description) = &category.description {
        summary_row("Description:", description);
    }
    summary_row("Created:", &category.created_at.to_rfc3339());
    summary_row("Updated:", &category.updated_at.to_rfc3339());
}
