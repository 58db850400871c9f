//! nanolink-simulator: physical-layer simulation of nanoscale communication
//! links.
//!
//! A scene file describes a set of devices sharing a medium and the physical
//! model of that medium (none, electromagnetic, or molecular). The simulator
//! wires one communication interface per device to the medium, injects the
//! configured transmissions, and drives the discrete-event queue until every
//! scheduled delivery has been resolved, reporting how many carriers the
//! receivers accepted. For molecular scenes the generated tube geometry and a
//! demonstration motor walk can be exported for external plotting.

use anyhow::Context;
use env_logger::Builder;
use log::LevelFilter;

mod common;
mod export;
mod molecular;
mod simulation;

use common::run_config::RunConfig;
use common::scene::{MediumModel, Scene, load_scene};
use export::Exporter;
use molecular::boundary::ReflectiveSphere;
use molecular::field::MicrotubuleField;
use molecular::geometry::Aabb;
use molecular::motion::MolecularMotion;
use simulation::motion::EmMotion;
use simulation::perturbation::{DefaultPerturbation, EmPerturbation, Perturbation};
use simulation::specificity::{DefaultSpecificity, EmSpecificity, Specificity};
use simulation::{CommunicationInterface, EventQueue, Field, InterfaceId, Medium};

fn main() -> anyhow::Result<()> {
    Builder::new().filter_level(LevelFilter::Info).parse_default_env().init();

    let scene_path = std::env::args().nth(1).context("usage: nanolink-simulator <scene.json>")?;
    let scene = load_scene(&scene_path)?;
    let run_config = RunConfig::load_for_scene(&scene_path).map_err(anyhow::Error::msg)?;

    log::info!("loaded scene {} with {} device(s)", scene_path, scene.devices.len());
    run(&scene, &run_config)
}

fn run(scene: &Scene, config: &RunConfig) -> anyhow::Result<()> {
    let field = build_field(scene, config);
    let mut medium = build_medium(scene, config);

    // Register one interface per device, in scene order
    let mut interface_ids: Vec<(u32, InterfaceId)> = Vec::with_capacity(scene.devices.len());
    for device in &scene.devices {
        let (perturbation, specificity) = build_strategies(scene);
        let id = medium.register_interface(CommunicationInterface::new(device.device_id, device.position, perturbation, specificity));
        interface_ids.push((device.device_id, id));
    }

    // Resolve the transmission schedule: explicit list, or every device once
    let transmitters: Vec<InterfaceId> = if config.transmitters.is_empty() {
        interface_ids.iter().map(|&(_, id)| id).collect()
    } else {
        config
            .transmitters
            .iter()
            .filter_map(|wanted| {
                let found = interface_ids.iter().find(|(device_id, _)| device_id == wanted).map(|&(_, id)| id);
                if found.is_none() {
                    log::warn!("transmitter device {} is not in the scene; skipping", wanted);
                }
                found
            })
            .collect()
    };

    let payload = vec![0u8; config.payload_size];
    let mut queue = EventQueue::new();
    for src in transmitters {
        medium
            .transmit_payload(src, &payload, &field, &mut queue)
            .with_context(|| format!("transmission from interface {} failed", src))?;
    }

    let scheduled = queue.len();
    let mut accepted: u64 = 0;
    let mut dropped: u64 = 0;
    while let Some(delivery) = queue.pop() {
        let dst_device = medium.interface(delivery.dst).device_id();
        match medium.deliver(delivery.src, delivery.dst, delivery.carrier) {
            Some(payload) => {
                accepted += 1;
                log::info!("device {} received {} byte(s) at t={:.6e} s", dst_device, payload.len(), delivery.time);
            }
            None => dropped += 1,
        }
    }

    log::info!(
        "run complete: {} delivery(ies) scheduled, {} accepted, {} dropped, final time {:.6e} s",
        scheduled,
        accepted,
        dropped,
        queue.now()
    );

    if let Some(dir) = &config.export_dir {
        write_exports(scene, config, &field, dir)?;
    }

    Ok(())
}

fn build_field(scene: &Scene, config: &RunConfig) -> Field {
    match (&scene.medium_model, &scene.tube_characteristics) {
        (MediumModel::Molecular, Some(characteristics)) => {
            let mut rng = seeded_rng(config.seed);
            Field::Microtubule(MicrotubuleField::generate(characteristics.clone(), &mut rng))
        }
        _ => Field::Generic,
    }
}

fn build_medium(scene: &Scene, config: &RunConfig) -> Medium {
    let mut medium = Medium::new();
    match scene.medium_model {
        MediumModel::Default => {}
        MediumModel::Electromagnetic => {
            // Validated at scene load: parameters are present
            if let Some(em) = &scene.em_parameters {
                medium.set_motion(Box::new(EmMotion::new(em.wave_speed)));
            }
        }
        MediumModel::Molecular => {
            if let Some(params) = &scene.molecular_parameters {
                let mut motion = MolecularMotion::new(params.clone(), config.seed);
                for boundary in &scene.boundaries {
                    motion.add_boundary(ReflectiveSphere::new(boundary.center, boundary.radius));
                }
                medium.set_motion(Box::new(motion));
            }
        }
    }
    medium
}

fn build_strategies(scene: &Scene) -> (Box<dyn Perturbation>, Box<dyn Specificity>) {
    match (&scene.medium_model, &scene.em_parameters) {
        (MediumModel::Electromagnetic, Some(em)) => (Box::new(EmPerturbation::new(em)), Box::new(EmSpecificity::new(em))),
        _ => (Box::new(DefaultPerturbation), Box::new(DefaultSpecificity)),
    }
}

/// Export tube geometry, the derived vector field, overlap diagnostics, a
/// demonstration motor walk between the first two devices, and the optional
/// persistence-length sweep.
fn write_exports(scene: &Scene, config: &RunConfig, field: &Field, dir: &str) -> anyhow::Result<()> {
    let Some(tubes) = field.microtubule() else {
        log::info!("export requested but the scene has no tube network; nothing to write");
        return Ok(());
    };

    let exporter = Exporter::new(dir)?;
    exporter.write_tube_geometry(tubes)?;
    exporter.write_vector_field(tubes)?;
    exporter.write_overlaps(tubes)?;

    if let (Some(params), [first, second, ..]) = (&scene.molecular_parameters, scene.devices.as_slice()) {
        let mut motor = MolecularMotion::new(params.clone(), config.seed.wrapping_add(1));
        for boundary in &scene.boundaries {
            motor.add_boundary(ReflectiveSphere::new(boundary.center, boundary.radius));
        }
        let destination = Aabb::around(second.position, params.destination_half_extent);
        let transit = motor.move_to_destination(first.position, &destination, tubes);
        log::info!(
            "demo walk from device {} toward device {}: {} position(s), {:.4e} s, reached: {}",
            first.device_id,
            second.device_id,
            motor.trace().len(),
            transit.elapsed,
            transit.reached
        );
        exporter.write_walk_trace(motor.trace())?;
    }

    if !config.persistence_sweep.is_empty() {
        if let Some(characteristics) = &scene.tube_characteristics {
            let mut rng = seeded_rng(config.seed.wrapping_add(2));
            let mut sweep_field = MicrotubuleField::generate(characteristics.clone(), &mut rng);
            let sweep = sweep_field.persistence_entropy_sweep(&config.persistence_sweep, &mut rng);
            exporter.write_persistence_sweep(&sweep)?;
        }
    }

    Ok(())
}

fn seeded_rng(seed: u64) -> rand::rngs::StdRng {
    use rand::SeedableRng;
    rand::rngs::StdRng::seed_from_u64(seed)
}
