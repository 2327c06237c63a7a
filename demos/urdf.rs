/*
  Copyright 2017 Takashi Ogura

  Licensed under the Apache License, Version 2.0 (the "License");
  you may not use this file except in compliance with the License.
  You may obtain a copy of the License at

      http://www.apache.org/licenses/LICENSE-2.0

  Unless required by applicable law or agreed to in writing, software
  distributed under the License is distributed on an "AS IS" BASIS,
  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
  See the License for the specific language governing permissions and
  limitations under the License.
*/
use kdiff::*;

fn main() {
    // Load urdf file
    let robot = urdf::chain_from_file::<f64, _>("urdf/sample.urdf").unwrap();
    println!("robot: {robot}");
    println!("joints = {:?}", robot.joint_names());

    // one row per sample, one column per movable joint
    let angles = DMatrix::from_row_slice(
        2,
        robot.dof(),
        &[0.0, 0.0, 0.0, 0.0, 0.0, 0.3, 0.1, -0.4, 0.9, 1.2],
    );
    let fk = ForwardKinematics::with_links(&robot, &["camera"]).unwrap();

    // Get the transform of the camera (forward kinematics)
    let poses = fk.forward(&angles).unwrap();
    for pose in &poses[0] {
        println!("camera = {pose}");
    }

    let (jacobians, _) = fk.jacobian(&angles).unwrap();
    println!("body jacobian = {}", jacobians[0][1]);

    // dL/dθ for L = x coordinate of the camera
    let state = fk.forward_state(&angles).unwrap();
    let mut upstream = Matrix3x4::zeros();
    upstream[(0, 3)] = 1.0;
    let gradient = fk.gradient(&state, &[vec![upstream; 2]]).unwrap();
    println!("gradient = {gradient}");
}
