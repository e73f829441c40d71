use crate::weather::types::ForecastEntry;
use crate::weather::WeatherRecord;
use image::ImageOutputFormat;
use plotters::prelude::*;
use std::io::Cursor;
use thiserror::Error;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const LINE_COLOR: RGBColor = RGBColor(255, 140, 0);

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("no forecast entries to plot")]
    EmptyForecast,
    #[error("chart rendering failed: {0}")]
    Render(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Collapse the 3-hourly forecast into one average temperature per day.
///
/// Days appear in first-seen order, which for an ordered forecast is
/// chronological. The date label is the "YYYY-MM-DD" prefix of each entry's
/// datetime string.
pub fn daily_average_temps(forecast: &[ForecastEntry]) -> Vec<(String, f64)> {
    let mut days: Vec<(String, Vec<f64>)> = Vec::new();

    for entry in forecast {
        let date = entry
            .datetime
            .split(' ')
            .next()
            .unwrap_or(&entry.datetime)
            .to_string();
        match days.iter_mut().find(|(d, _)| *d == date) {
            Some((_, temps)) => temps.push(entry.temp),
            None => days.push((date, vec![entry.temp])),
        }
    }

    days.into_iter()
        .map(|(date, temps)| {
            let avg = temps.iter().sum::<f64>() / temps.len() as f64;
            (date, avg)
        })
        .collect()
}

/// Render the record's per-day average temperatures as a PNG line chart.
pub fn render_temperature_chart(record: &WeatherRecord) -> Result<Vec<u8>, PlotError> {
    let series = daily_average_temps(&record.forecast);
    if series.is_empty() {
        return Err(PlotError::EmptyForecast);
    }

    let temps: Vec<f64> = series.iter().map(|(_, t)| *t).collect();
    let min_temp = temps.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_temp = temps.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((max_temp - min_temp) * 0.1).max(1.0);

    let mut buf = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| PlotError::Render(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Average Daily Temperature for {}", record.city),
                ("sans-serif", 28),
            )
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(50)
            .build_cartesian_2d(
                0..(series.len() as i32 - 1).max(1),
                (min_temp - pad)..(max_temp + pad),
            )
            .map_err(|e| PlotError::Render(e.to_string()))?;

        chart
            .configure_mesh()
            .x_labels(series.len())
            .x_label_formatter(&|idx| {
                series
                    .get(*idx as usize)
                    .map(|(date, _)| date.clone())
                    .unwrap_or_default()
            })
            .x_desc("Date")
            .y_desc("Avg Temp (°C)")
            .draw()
            .map_err(|e| PlotError::Render(e.to_string()))?;

        let points: Vec<(i32, f64)> = temps
            .iter()
            .enumerate()
            .map(|(i, t)| (i as i32, *t))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), &LINE_COLOR))
            .map_err(|e| PlotError::Render(e.to_string()))?;
        chart
            .draw_series(
                points
                    .iter()
                    .map(|p| Circle::new(*p, 4, LINE_COLOR.filled())),
            )
            .map_err(|e| PlotError::Render(e.to_string()))?;

        root.present().map_err(|e| PlotError::Render(e.to_string()))?;
    }

    let rgb = image::RgbImage::from_raw(WIDTH, HEIGHT, buf)
        .ok_or_else(|| PlotError::Render("pixel buffer size mismatch".to_string()))?;
    let mut png = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;
    Ok(png)
}
