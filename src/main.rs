use log::{error, info};
use painter::core::framebuffer::FrameBuffer;
use painter::io::cli::Cli;
use painter::io::config::Config;
use painter::io::image::save_buffer_to_image;
use painter::io::model_loader::load_model;
use painter::scene::mesh::Mesh;
use painter::scene::viewer::Viewer;
use std::time::Instant;

fn main() -> Result<(), String> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp(None)
        .format_level(true)
        .init();

    let config = Cli::process().inspect_err(|e| error!("{}", e))?;
    run(&config).inspect_err(|e| error!("{}", e))
}

fn run(config: &Config) -> Result<(), String> {
    // 1. Load the model
    let mut mesh = match &config.model.path {
        Some(path) => load_model(path)?,
        None => {
            info!("No model given, rendering the built-in cube");
            Mesh::create_cube()
        }
    };

    // 2. Set up the viewer
    let (width, height) = (config.render.width, config.render.height);
    let mut viewer = Viewer::new(width, height);
    viewer.solid = config.render.solid;
    viewer.wireframe = config.render.wireframe;
    viewer.cull_back_face = config.render.cull_back_face;
    viewer.clear_color = config.clear_color()?;
    viewer.flat.color = config.wire_color()?;
    viewer.light = config.light.to_light();

    // 3. Place the model, then apply the configured edits
    let transform = &config.transform;
    viewer.fit_model(mesh.max_size);
    viewer.scale_by(transform.scale);
    viewer.rotate_x(transform.rotation[0]);
    viewer.rotate_y(transform.rotation[1]);
    viewer.rotate_z(transform.rotation[2]);
    let [tx, ty, tz] = transform.translation;
    viewer.translate_by(tx * mesh.max_size, ty * mesh.max_size, tz * mesh.max_size);

    // 4. Order back to front and draw
    let start = Instant::now();
    viewer.update_transform(&mut mesh);
    let mut framebuffer = FrameBuffer::new(width, height);
    let (solid, wire) = viewer.render(&mesh, &mut framebuffer);
    info!(
        "Rendered {} triangles in {:.2?}",
        mesh.triangle_count(),
        start.elapsed()
    );
    if let Some(stats) = solid {
        info!(
            "Solid: {} drawn, {} clipped, {} culled, {} rejected",
            stats.drawn, stats.clipped, stats.culled, stats.rejected
        );
    }
    if let Some(stats) = wire {
        info!(
            "Wireframe: {} drawn, {} clipped, {} culled, {} rejected",
            stats.drawn, stats.clipped, stats.culled, stats.rejected
        );
    }

    // 5. Save
    save_buffer_to_image(
        framebuffer.pixels(),
        framebuffer.width,
        framebuffer.height,
        &config.render.output,
    )
}
