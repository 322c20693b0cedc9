use std::{sync::Arc, thread::JoinHandle};

use crossbeam::channel::{Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use crate::{camera::Camera, transfer_function::TransferFunction, volumetric::Volume};

use super::{params::RenderParams, renderer::Renderer};

/// Sample count used for interactive (fast) frames.
const INTERACTIVE_SAMPLES: u32 = 20;

/// Messages to the render thread.
///
/// Messages queue up; one is read after each frame is done.
pub enum RendererMessage {
    /// Render a frame at full quality
    StartRendering,
    /// Render a lower quality frame, for live interaction
    StartRenderingFast,
    /// Swap the dataset before the next frame
    NewVolume(Volume),
    /// Swap the transfer function before the next frame
    NewTransferFunction(TransferFunction),
    /// Replace rendering parameters before the next frame
    NewParams(RenderParams),
    /// Shut down, thread gets ready to be joined
    ShutDown,
}

/// Interface for renderers running in a different thread.
///
/// Must be implemented by renderers that wish to communicate using
/// [`RendererFront`].
pub trait RenderThread {
    /// Get reference to the shared framebuffer
    fn get_shared_buffer(&self) -> Arc<Mutex<Vec<u8>>>;

    /// Get reference to the camera
    ///
    /// A write lock allows changing the viewpoint between frames.
    fn get_camera(&self) -> Arc<RwLock<Camera>>;

    /// Spawn the render thread
    ///
    /// The renderer waits for messages, it does _not_ start rendering.
    /// Returns a handle which can be used to sync with the parent thread.
    fn start(self) -> JoinHandle<()>;

    /// Communication setter
    fn set_communication(&mut self, communication: (Sender<()>, Receiver<RendererMessage>));
}

/// Handle for communicating with a renderer on another thread.
///
/// Can be active or inactive.
pub struct RendererFront {
    handle: Option<JoinHandle<()>>,
    buffer: Option<Arc<Mutex<Vec<u8>>>>,
    camera: Option<Arc<RwLock<Camera>>>,
    communication_in: (Sender<RendererMessage>, Receiver<RendererMessage>),
    communication_out: (Sender<()>, Receiver<()>),
}

impl RendererFront {
    /// Create an inactive front
    pub fn new() -> Self {
        let communication_in = crossbeam::channel::bounded(100); // main -> renderer
        let communication_out = crossbeam::channel::bounded(100); // renderer -> main
        Self {
            handle: None,
            buffer: None,
            camera: None,
            communication_in,
            communication_out,
        }
    }

    /// Getter for the message sender, for control from other threads
    pub fn get_sender(&self) -> Sender<RendererMessage> {
        self.communication_in.0.clone()
    }

    /// Send a message to the renderer
    pub fn send_message(&self, msg: RendererMessage) {
        // the channel outlives the front, send cannot fail
        let _ = self.communication_in.0.send(msg);
    }

    /// Getter for the frame-done receiver
    ///
    /// One unit message arrives per finished frame; the shared buffer can
    /// then be read.
    pub fn get_receiver(&self) -> Receiver<()> {
        self.communication_out.1.clone()
    }

    /// Block until the next frame is done
    pub fn receive_message(&self) {
        let _ = self.communication_out.1.recv();
    }

    /// Getter for the shared framebuffer
    /// If the front is inactive, returns `None`
    pub fn get_buffer_handle(&self) -> Option<Arc<Mutex<Vec<u8>>>> {
        self.buffer.as_ref().cloned()
    }

    /// Getter for the camera handle
    /// If the front is inactive, returns `None`
    pub fn get_camera_handle(&self) -> Option<Arc<RwLock<Camera>>> {
        self.camera.as_ref().cloned()
    }

    /// Start `renderer`
    ///
    /// The front goes into the active state. If it was already active, the
    /// previous renderer gets shut down first.
    pub fn start_rendering<R: RenderThread>(&mut self, mut renderer: R) {
        if let Some(handle) = self.handle.take() {
            log::info!("shutting down current render thread");
            let _ = self.communication_in.0.send(RendererMessage::ShutDown);
            let _ = handle.join();
            self.buffer = None;
        }

        let communication = (
            self.communication_out.0.clone(),
            self.communication_in.1.clone(),
        );
        renderer.set_communication(communication);
        let buffer = renderer.get_shared_buffer();
        let camera = renderer.get_camera();
        let handle = renderer.start(); // thread waits for a StartRendering message
        self.buffer = Some(buffer);
        self.handle = Some(handle);
        self.camera = Some(camera);
    }

    /// Join the render thread
    ///
    /// A `ShutDown` message must be sent first separately. Blocks until the
    /// thread is joined; the front goes into the inactive state.
    pub fn finish(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            self.buffer = None;
            self.camera = None;
        }
    }
}

impl Default for RendererFront {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-threaded render loop behind the [`RendererFront`] interface.
pub struct SerialRenderThread {
    renderer: Renderer,
    shared_buffer: Arc<Mutex<Vec<u8>>>,
    camera: Arc<RwLock<Camera>>,
    communication: (Sender<()>, Receiver<RendererMessage>),
}

impl SerialRenderThread {
    pub fn new(volume: Volume, params: RenderParams) -> SerialRenderThread {
        let (width, height) = params.resolution;
        let buffer = Arc::new(Mutex::new(vec![0; width * height * 3]));

        // dummy channels, replaced by set_communication before start
        let (sender_void, _) = crossbeam::channel::unbounded();
        let never = crossbeam::channel::never();

        SerialRenderThread {
            renderer: Renderer::new(volume, params),
            shared_buffer: buffer,
            camera: Arc::new(RwLock::new(Camera::new())),
            communication: (sender_void, never),
        }
    }

    fn render_loop(mut self) {
        loop {
            let msg = match self.communication.1.recv() {
                Ok(msg) => msg,
                // front dropped without a ShutDown
                Err(_) => break,
            };

            let fast = match msg {
                RendererMessage::StartRendering => false,
                RendererMessage::StartRenderingFast => true,
                RendererMessage::NewVolume(volume) => {
                    self.renderer.set_volume(volume);
                    continue;
                }
                RendererMessage::NewTransferFunction(tf) => {
                    self.renderer.set_transfer_function(tf);
                    continue;
                }
                RendererMessage::NewParams(params) => {
                    self.renderer.set_render_params(params);
                    continue;
                }
                RendererMessage::ShutDown => break,
            };

            let quality = if fast {
                let mut interactive = self.renderer.params().clone();
                interactive.set_num_samples(INTERACTIVE_SAMPLES);
                Some(interactive)
            } else {
                None
            };

            {
                let camera = self.camera.read().clone();
                let mut buffer = self.shared_buffer.lock();

                match quality {
                    Some(interactive) => {
                        // lower the quality only for this frame
                        let full = self.renderer.params().clone();
                        self.renderer.set_render_params(interactive);
                        self.renderer.render_to_buffer(&camera, &mut buffer[..]);
                        self.renderer.set_render_params(full);
                    }
                    None => self.renderer.render_to_buffer(&camera, &mut buffer[..]),
                }
            }

            let _ = self.communication.0.send(());
        }
    }
}

impl RenderThread for SerialRenderThread {
    fn get_shared_buffer(&self) -> Arc<Mutex<Vec<u8>>> {
        self.shared_buffer.clone()
    }

    fn get_camera(&self) -> Arc<RwLock<Camera>> {
        self.camera.clone()
    }

    fn start(self) -> JoinHandle<()> {
        std::thread::spawn(move || self.render_loop())
    }

    fn set_communication(&mut self, communication: (Sender<()>, Receiver<RendererMessage>)) {
        self.communication = communication;
    }
}
