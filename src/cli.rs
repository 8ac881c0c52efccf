// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for headless check-in operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Capturing a single check-in photo
//! - Printing the face-frame cutout for a viewport

use facecapture::backends::camera::create_platform;
use facecapture::config::Config;
use facecapture::overlay::{CutoutGeometry, Viewport};
use facecapture::storage;
use facecapture::surface::{CaptureSurface, PermissionState};
use std::path::PathBuf;

/// List all cameras of the configured backend
pub fn list_cameras(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let platform = create_platform(config)?;
    let cameras = platform.enumerate_cameras();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras ({}):", platform.backend_type());
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
        println!("      Path: {}", camera.path);
        if let Some(driver) = &camera.driver {
            println!("      Driver: {}", driver);
        }
        println!();
    }

    Ok(())
}

/// Run one check-in capture: permission, mount, capture, save
pub fn capture_photo(
    config: &Config,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let platform = create_platform(config)?;
    let mut surface = CaptureSurface::new(platform)
        .with_format(config.photo_format)
        .with_quality(config.photo_quality);

    // Create async runtime for the capture
    let rt = tokio::runtime::Runtime::new()?;
    let saved = rt.block_on(async {
        match surface.resolve_permission().await {
            PermissionState::Granted => {}
            state => return Err(format!("Camera permission {:?}", state).into()),
        }

        surface.mount()?;
        println!("Capturing...");
        let payload = surface.capture().await?;
        println!(
            "Captured {}x{} ({} bytes)",
            payload.width,
            payload.height,
            payload.len()
        );

        let saved = match output {
            Some(path) if !path.is_dir() => storage::save_payload_to(payload, path).await?,
            Some(dir) => storage::save_payload(payload, dir).await?,
            None => storage::save_payload(payload, config.photo_dir()).await?,
        };
        Ok::<_, Box<dyn std::error::Error>>(saved)
    })?;

    surface.unmount();
    println!("Photo saved: {}", saved.display());
    Ok(())
}

/// Print the cutout geometry for a viewport
pub fn print_geometry(
    config: &Config,
    width: f32,
    height: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    if !(width > 0.0 && height > 0.0) {
        return Err(format!("Invalid viewport {}x{}", width, height).into());
    }

    let geometry = CutoutGeometry::compute(Viewport::new(width, height), config.overlay.layout());
    println!("Viewport: {}x{}", width, height);
    println!("Radius:   {}", geometry.radius);
    println!("Center:   ({}, {})", geometry.center_x, geometry.center_y);
    Ok(())
}
