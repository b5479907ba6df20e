use queuesim::{simulate, SimulationParams};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Two checkout counters, a customer every five time units on average
    let params = SimulationParams::new(2, 0.2, 3.0, 100.0)
        .with_seed(42)
        .with_verbose(true);

    let report = simulate(&params)?;

    for entry in &report.trace {
        println!("{}", entry);
    }

    let report = report.rounded(2);
    println!("\n--- Simulation Results ---");
    println!("total_customers: {}", report.total_customers);
    println!("avg_wait_time: {}", report.avg_wait_time);
    println!("avg_system_time: {}", report.avg_system_time);
    println!("customers_in_system_at_horizon: {}", report.customers_in_system_at_horizon);
    Ok(())
}
