//! Dummy-cam binary: attach a simulated sensor from a JSON property file.

use dummy_cam::{FrameFormat, JsonSource, SubdevRegistry, Subdevice, Which};

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: dummy-cam <properties.json>")?;
    let text = std::fs::read_to_string(&path)?;
    let source = JsonSource::parse(&text)?;

    let mut registry = SubdevRegistry::new();
    let name = registry.attach(&source, "1-003c")?;
    let device = registry.get(&name).ok_or("device not registered")?;

    println!("Device: {name}");

    let mut fmt = FrameFormat::default();
    device.get_fmt(Which::Active, &mut fmt)?;
    println!("Format: {}x{} {}", fmt.width, fmt.height, fmt.code);
    println!("Frame interval: {} fps", device.frame_interval()?);

    for control in device.controls().iter() {
        println!("Control {}: {}", control.id, control.value());
    }

    Ok(())
}
