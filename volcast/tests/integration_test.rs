use nalgebra::vector;
use volcast::{
    progress::NoProgress,
    render::{
        CompositingMethod, RenderParams, Renderer, RendererFront, RendererMessage,
        SerialRenderThread,
    },
    test_helpers::encode_volume,
    volumetric, Camera, InputEvent, TransferFunction,
};

const WIDTH: usize = 64;
const HEIGHT: usize = 64;

/// Centered bright blob, dark outside.
fn blob_bytes(side: usize) -> Vec<u8> {
    let center = (side as f32 - 1.0) / 2.0;
    let mut raw = Vec::with_capacity(side * side * side);

    for z in 0..side {
        for y in 0..side {
            for x in 0..side {
                let d = ((x as f32 - center).powi(2)
                    + (y as f32 - center).powi(2)
                    + (z as f32 - center).powi(2))
                .sqrt();
                let value = (255.0 * (1.0 - d / center)).clamp(0.0, 255.0);
                raw.push(value as u16);
            }
        }
    }

    encode_volume(vector![side, side, side], 8, &raw)
}

fn params(method: CompositingMethod) -> RenderParams {
    let mut params = RenderParams::default();
    params.resolution = (WIDTH, HEIGHT);
    params.set_num_samples(100);
    params.set_compositing_method(method);
    params
}

fn center_pixel(buffer: &[u8]) -> [u8; 3] {
    let index = (WIDTH / 2 + HEIGHT / 2 * WIDTH) * 3;
    [buffer[index], buffer[index + 1], buffer[index + 2]]
}

#[test]
fn inline_render_pipeline() {
    let bytes = blob_bytes(16);
    let volume = volumetric::from_bytes(bytes.clone(), &NoProgress).unwrap();

    let mut camera = Camera::new();
    camera.handle_event(InputEvent::Drag { dx: 40.0, dy: 25.0 });

    let mut buffer = vec![0; WIDTH * HEIGHT * 3];

    for method in [
        CompositingMethod::Alpha,
        CompositingMethod::Mida,
        CompositingMethod::Mip,
        CompositingMethod::Average,
    ] {
        let mut renderer = Renderer::new(
            volumetric::from_bytes(bytes.clone(), &NoProgress).unwrap(),
            params(method),
        );
        renderer.render_to_buffer(&camera, &mut buffer);

        // blob center is bright under every accumulating method
        assert_ne!(center_pixel(&buffer), [0, 0, 0], "{method:?}");
        // corners are outside the cube silhouette
        assert_eq!(&buffer[0..3], [0, 0, 0], "{method:?}");
    }

    // MINIP sees the dark blob edge along every ray
    let mut renderer = Renderer::new(volume, params(CompositingMethod::Minip));
    renderer.render_to_buffer(&camera, &mut buffer);
    let minip = center_pixel(&buffer);
    assert!(minip[0] < 16);
}

#[test]
fn shaded_render_is_darker_nowhere_brighter() {
    let bytes = blob_bytes(16);
    let camera = Camera::new();
    let mut buffer = vec![0; WIDTH * HEIGHT * 3];
    let mut shaded_buffer = vec![0; WIDTH * HEIGHT * 3];

    let mut p = params(CompositingMethod::Alpha);
    let mut renderer = Renderer::new(volumetric::from_bytes(bytes, &NoProgress).unwrap(), p.clone());
    renderer.render_to_buffer(&camera, &mut buffer);

    p.set_shading(true);
    p.set_shading_threshold(0.0);
    renderer.set_render_params(p);
    renderer.render_to_buffer(&camera, &mut shaded_buffer);

    for (plain, shaded) in buffer.iter().zip(shaded_buffer.iter()) {
        // rounding can move a channel by one step
        assert!(*shaded <= plain.saturating_add(1));
    }
}

#[test]
fn render_thread_api() {
    let bytes = blob_bytes(16);
    let volume = volumetric::from_bytes(bytes, &NoProgress).unwrap();

    let serial = SerialRenderThread::new(volume, params(CompositingMethod::Mip));

    let mut front = RendererFront::new();
    front.start_rendering(serial);

    let camera = front.get_camera_handle().unwrap();
    camera.write().handle_event(InputEvent::Drag { dx: 30.0, dy: 10.0 });

    front.send_message(RendererMessage::StartRendering);
    front.receive_message();

    let full_frame = {
        let buffer = front.get_buffer_handle().unwrap();
        let guard = buffer.lock();
        assert_ne!(center_pixel(&guard), [0, 0, 0]);
        guard.clone()
    };

    // interactive frames reuse the same buffer and still cover the volume
    front.send_message(RendererMessage::StartRenderingFast);
    front.receive_message();

    {
        let buffer = front.get_buffer_handle().unwrap();
        let guard = buffer.lock();
        assert_ne!(center_pixel(&guard), [0, 0, 0]);
    }

    // a full-quality frame after a fast one restores the original output
    front.send_message(RendererMessage::StartRendering);
    front.receive_message();

    {
        let buffer = front.get_buffer_handle().unwrap();
        let guard = buffer.lock();
        assert_eq!(*guard, full_frame);
    }

    front.send_message(RendererMessage::ShutDown);
    front.finish();
}

#[test]
fn render_thread_swaps_volume_and_tf() {
    let bytes = blob_bytes(16);
    let volume = volumetric::from_bytes(bytes, &NoProgress).unwrap();

    let mut p = params(CompositingMethod::Mip);
    p.background = vector![0.0, 0.0, 1.0];

    let serial = SerialRenderThread::new(volume, p);
    let mut front = RendererFront::new();
    front.start_rendering(serial);

    // an empty placeholder dataset leaves only the background
    front.send_message(RendererMessage::NewVolume(Default::default()));
    front.send_message(RendererMessage::StartRendering);
    front.receive_message();

    {
        let buffer = front.get_buffer_handle().unwrap();
        let guard = buffer.lock();
        assert_eq!(center_pixel(&guard), [0, 0, 255]);
    }

    // an all-red opaque transfer function paints the placeholder volume red
    let red = TransferFunction::from_table(vec![volcast::color::new(1.0, 0.0, 0.0, 1.0)]);
    front.send_message(RendererMessage::NewTransferFunction(red));
    front.send_message(RendererMessage::StartRendering);
    front.receive_message();

    {
        let buffer = front.get_buffer_handle().unwrap();
        let guard = buffer.lock();
        assert_eq!(center_pixel(&guard), [255, 0, 0]);
    }

    front.send_message(RendererMessage::ShutDown);
    front.finish();
}
