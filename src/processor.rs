use hdr_color::{IccProfile, TonePipeline};
use hdr_grid::{
    raster::{InterleavedImage, Sample},
    LinearImage, RasterSink, RasterSource, Rect,
};
use hdr_resample::{ResampleKernel, Resampler};
use hdr_threadpool::ThreadPool;

use crate::Result;

/// Builder for [`Processor`].
#[derive(Debug, Default)]
pub struct ProcessorBuilder {
    pool: Option<ThreadPool>,
    pipeline: Option<TonePipeline>,
    kernel: Option<ResampleKernel>,
}

impl ProcessorBuilder {
    /// Sets a custom thread pool.
    pub fn pool(mut self, pool: ThreadPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Sets the tone pipeline. sRGB is used if not set.
    pub fn pipeline(mut self, pipeline: TonePipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Uses the RGB tone curves of the ICC profile.
    pub fn profile(self, profile: &IccProfile) -> Result<Self> {
        let pipeline = TonePipeline::from_profile(profile)?;
        Ok(self.pipeline(pipeline))
    }

    /// Sets the resampling kernel. Lanczos3 is used if not set.
    pub fn kernel(mut self, kernel: ResampleKernel) -> Self {
        self.kernel = Some(kernel);
        self
    }

    /// Builds the processor.
    ///
    /// Without a pool set, a new default [`ThreadPool`] is created, which spawns its own workers
    /// when the `rayon` feature is enabled.
    pub fn build(self) -> Processor {
        let pool = self.pool.unwrap_or_default();
        tracing::debug!(num_threads = pool.num_threads(), "Processor created");
        Processor {
            pipeline: self.pipeline.unwrap_or_else(TonePipeline::srgb),
            resampler: Resampler::new(self.kernel.unwrap_or(ResampleKernel::Lanczos3), pool),
        }
    }
}

/// Ties a thread pool, a tone pipeline and a resampling kernel together.
///
/// Encoded images are decoded to linear light, resampled there, and encoded back with the same
/// tone curves.
#[derive(Debug, Clone)]
pub struct Processor {
    pipeline: TonePipeline,
    resampler: Resampler,
}

impl Default for Processor {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Processor {
    pub fn builder() -> ProcessorBuilder {
        ProcessorBuilder::default()
    }

    #[inline]
    pub fn pool(&self) -> &ThreadPool {
        self.resampler.pool()
    }

    #[inline]
    pub fn pipeline(&self) -> &TonePipeline {
        &self.pipeline
    }

    #[inline]
    pub fn kernel(&self) -> ResampleKernel {
        self.resampler.kernel()
    }

    /// Decodes an encoded image to linear light.
    pub fn decode(&self, source: &(impl RasterSource + ?Sized)) -> Result<LinearImage> {
        Ok(self.pipeline.decode_tone(source, self.pool())?)
    }

    pub fn encode_into(&self, linear: &LinearImage, sink: &mut (impl RasterSink + ?Sized)) {
        self.pipeline.encode_tone_into(linear, sink, self.pool());
    }

    pub fn encode<S: Sample>(&self, linear: &LinearImage) -> Result<InterleavedImage<S>> {
        Ok(self.pipeline.encode_tone(linear, self.pool())?)
    }

    pub fn resample(&self, linear: &LinearImage, dst_bounds: Rect) -> Result<LinearImage> {
        Ok(self.resampler.resample(linear, dst_bounds)?)
    }

    /// Decodes, resamples to `dst_bounds`, and encodes into a new NRGBA image.
    pub fn resize<S: Sample>(
        &self,
        source: &(impl RasterSource + ?Sized),
        dst_bounds: Rect,
    ) -> Result<InterleavedImage<S>> {
        let _guard = tracing::trace_span!("Resize", kernel = ?self.kernel()).entered();
        let linear = self.decode(source)?;
        let resampled = self.resample(&linear, dst_bounds)?;
        self.encode(&resampled)
    }
}
